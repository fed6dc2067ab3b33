//! Item input and out-of-band bonus merging.
//!
//! Besides lore, an item may carry bonus values stored in its tag data by
//! another plugin. The bonus store is external; attributes only see it through
//! [`BonusSource`], keyed by attribute name.

use crate::status::StatusData;

/// An item as seen by lore extraction: its lore lines, markup included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemStack {
    pub lore: Vec<String>,
}

impl ItemStack {
    pub fn new<I, S>(lore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lore: lore.into_iter().map(Into::into).collect(),
        }
    }
}

/// Lookup of bonus values stored per item, outside of its lore.
pub trait BonusSource {
    fn bonus(&self, item: &ItemStack, attribute: &str) -> Option<StatusData>;
}

/// Bonus source for items without tag data.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBonus;

impl BonusSource for NoBonus {
    fn bonus(&self, _item: &ItemStack, _attribute: &str) -> Option<StatusData> {
        None
    }
}

impl<F> BonusSource for F
where
    F: Fn(&ItemStack, &str) -> Option<StatusData>,
{
    fn bonus(&self, item: &ItemStack, attribute: &str) -> Option<StatusData> {
        self(item, attribute)
    }
}

/// Adds every item's stored bonus for `attribute` onto the lore value.
pub fn merge_bonuses(
    items: &[ItemStack],
    attribute: &str,
    lore_value: StatusData,
    bonus: &dyn BonusSource,
) -> StatusData {
    items
        .iter()
        .filter_map(|item| bonus.bonus(item, attribute))
        .fold(lore_value, |total, extra| total + extra)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bonus_keeps_lore_value() {
        let items = [ItemStack::new(["+5 ATK"])];
        let merged = merge_bonuses(&items, "Damage", StatusData::flat(5.0), &NoBonus);

        assert_eq!(merged, StatusData::flat(5.0));
    }

    #[test]
    fn bonuses_are_keyed_by_attribute() {
        let items = [
            ItemStack::new(["Sword"]),
            ItemStack::new(["Ring"]),
            ItemStack::default(),
        ];
        let bonus = |item: &ItemStack, attribute: &str| match (item.lore.first(), attribute) {
            (Some(line), "Damage") if line == "Sword" => Some(StatusData::from_parts(1.0, 2.0, 0.0)),
            (Some(line), "Damage") if line == "Ring" => Some(StatusData::percent(10.0)),
            (Some(_), "Defense") => Some(StatusData::flat(100.0)),
            _ => None,
        };

        let merged = merge_bonuses(&items, "Damage", StatusData::flat(3.0), &bonus);
        assert_eq!(merged, StatusData::from_parts(4.0, 5.0, 10.0));
    }
}
