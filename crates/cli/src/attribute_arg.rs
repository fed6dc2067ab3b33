//! `--attribute NAME[:KIND[:percent]]` values.

use attribute_core::{ConfiguredAttribute, StatusType};

/// An attribute requested on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeArg {
    pub name: String,
    pub kind: StatusType,
    pub percent: bool,
}

impl AttributeArg {
    /// Attribute found as a config file, without a kind on the command line.
    pub fn from_config_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: StatusType::Custom,
            percent: false,
        }
    }

    pub fn into_attribute(self) -> ConfiguredAttribute {
        ConfiguredAttribute::new(self.name, self.kind).percent(self.percent)
    }
}

/// clap value parser.
pub fn parse_attribute(value: &str) -> Result<AttributeArg, String> {
    let mut parts = value.split(':');

    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err("attribute name is empty".to_string());
    }

    let kind = match parts.next() {
        Some(kind) => kind
            .parse::<StatusType>()
            .map_err(|_| format!("unknown attribute kind {kind:?}"))?,
        None => StatusType::Custom,
    };

    let percent = match parts.next() {
        Some(flag) if flag.eq_ignore_ascii_case("percent") => true,
        Some(flag) => return Err(format!("unknown attribute flag {flag:?}")),
        None => false,
    };

    if let Some(extra) = parts.next() {
        return Err(format!("unexpected trailing segment {extra:?}"));
    }

    Ok(AttributeArg {
        name: name.to_string(),
        kind,
        percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_alone_is_custom() {
        assert_eq!(
            parse_attribute("Damage"),
            Ok(AttributeArg {
                name: "Damage".into(),
                kind: StatusType::Custom,
                percent: false,
            })
        );
    }

    #[test]
    fn kind_and_percent_flag() {
        assert_eq!(
            parse_attribute("Crit:attack:percent"),
            Ok(AttributeArg {
                name: "Crit".into(),
                kind: StatusType::Attack,
                percent: true,
            })
        );
    }

    #[test]
    fn rejects_bad_segments() {
        assert!(parse_attribute(":attack").is_err());
        assert!(parse_attribute("Damage:melee").is_err());
        assert!(parse_attribute("Damage:attack:flat").is_err());
        assert!(parse_attribute("Damage:attack:percent:x").is_err());
    }
}
