//! Pizza artwork state driven by the cheese and pepperoni checkboxes.
//!
//! The mapping is a table from the selected subset of image toppings to a
//! visual state, so adding artwork means adding rows, not branches.

use serde::Serialize;

use crate::projection::ToppingProjection;
use crate::types::ToppingType;

/// Toppings that have artwork. Toggling anything else leaves the image alone.
pub const IMAGE_TOPPINGS: [ToppingType; 2] = [ToppingType::Cheese, ToppingType::Pepperoni];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PizzaImageState {
    #[default]
    Base,
    CheeseOnly,
    PepperoniNoCheese,
    PepperoniWithCheese,
}

impl PizzaImageState {
    /// Class applied to the `.pie` element. The cheese pizza is the default
    /// artwork and needs none; any previous class is always removed first.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            PizzaImageState::Base => Some("pie-updated"),
            PizzaImageState::CheeseOnly => None,
            PizzaImageState::PepperoniNoCheese => Some("pie-updated-pepperoni-no-cheese"),
            PizzaImageState::PepperoniWithCheese => Some("pie-updated-pepperoni"),
        }
    }
}

/// Exact selected subset of `IMAGE_TOPPINGS`, in `IMAGE_TOPPINGS` order.
const IMAGE_RULES: &[(&[ToppingType], PizzaImageState)] = &[
    (&[], PizzaImageState::Base),
    (&[ToppingType::Cheese], PizzaImageState::CheeseOnly),
    (&[ToppingType::Pepperoni], PizzaImageState::PepperoniNoCheese),
    (&[ToppingType::Cheese, ToppingType::Pepperoni], PizzaImageState::PepperoniWithCheese),
];

/// Look up the visual state for the image toppings `is_selected` reports.
pub fn image_state_for(is_selected: impl Fn(ToppingType) -> bool) -> PizzaImageState {
    let selected: Vec<ToppingType> = IMAGE_TOPPINGS.into_iter().filter(|t| is_selected(*t)).collect();
    IMAGE_RULES
        .iter()
        .find(|(subset, _)| *subset == selected.as_slice())
        .map(|(_, state)| *state)
        .unwrap_or_default()
}

/// Image state after `toggled` changed, reading selection flags from
/// `projection`. Returns `current` unchanged for toppings without artwork.
pub fn derive_image_state(
    current: PizzaImageState,
    toggled: ToppingType,
    projection: &ToppingProjection,
) -> PizzaImageState {
    if !IMAGE_TOPPINGS.contains(&toggled) {
        return current;
    }
    image_state_for(|t| projection.is_selected(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToppingAmount;

    #[test]
    fn table_covers_every_selection_pair() {
        let cases = [
            (false, false, PizzaImageState::Base),
            (true, false, PizzaImageState::CheeseOnly),
            (false, true, PizzaImageState::PepperoniNoCheese),
            (true, true, PizzaImageState::PepperoniWithCheese),
        ];
        for (cheese, pepperoni, expected) in cases {
            let state = image_state_for(|t| match t {
                ToppingType::Cheese => cheese,
                ToppingType::Pepperoni => pepperoni,
                _ => false,
            });
            assert_eq!(state, expected, "cheese={cheese} pepperoni={pepperoni}");
        }
    }

    #[test]
    fn other_toppings_do_not_affect_lookup() {
        let state = image_state_for(|t| t != ToppingType::Pepperoni);
        assert_eq!(state, PizzaImageState::CheeseOnly);
    }

    #[test]
    fn non_image_topping_is_noop() {
        let projection = ToppingProjection::default().begin_upsert(ToppingType::Cheese, ToppingAmount::Regular, 1);
        let current = PizzaImageState::PepperoniWithCheese;
        assert_eq!(derive_image_state(current, ToppingType::Olives, &projection), current);
        assert_eq!(
            derive_image_state(current, ToppingType::Cheese, &projection),
            PizzaImageState::CheeseOnly
        );
    }

    #[test]
    fn css_classes() {
        assert_eq!(PizzaImageState::Base.css_class(), Some("pie-updated"));
        assert_eq!(PizzaImageState::CheeseOnly.css_class(), None);
        assert_eq!(
            PizzaImageState::PepperoniNoCheese.css_class(),
            Some("pie-updated-pepperoni-no-cheese")
        );
        assert_eq!(PizzaImageState::PepperoniWithCheese.css_class(), Some("pie-updated-pepperoni"));
    }
}
