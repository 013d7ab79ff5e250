// Shuttlers Layered Binding Table
// Priority-ordered layers gated by held activation buttons

use crate::binding::{Binding, Control, Direction, PhysicalKey, NUM_KEYS};
use crate::state::ButtonState;

/// Bindings of one layer for every bindable control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layer {
    name: String,
    activation: Option<PhysicalKey>,
    keys: [Binding; NUM_KEYS],
    jog: [Binding; 2],
    shuttle: [Binding; 2],
}

fn direction_slot(direction: Direction) -> usize {
    match direction {
        Direction::Clockwise => 0,
        Direction::CounterClockwise => 1,
    }
}

impl Layer {
    /// Create the unconditional base layer
    pub fn base(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a layer active while `activation` is held
    pub fn activated_by(name: impl Into<String>, activation: PhysicalKey) -> Self {
        Self {
            name: name.into(),
            activation: Some(activation),
            ..Self::default()
        }
    }

    /// Get the name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Activation button, `None` for the base layer
    pub fn activation(&self) -> Option<PhysicalKey> {
        self.activation
    }

    /// Binding of a control in this layer
    pub fn get(&self, control: Control) -> Binding {
        match control {
            Control::Button(key) => self.keys[key.index()],
            Control::Jog(direction) => self.jog[direction_slot(direction)],
            Control::Shuttle(direction) => self.shuttle[direction_slot(direction)],
        }
    }

    /// Bind a control in this layer
    pub fn set(&mut self, control: Control, binding: Binding) {
        match control {
            Control::Button(key) => self.keys[key.index()] = binding,
            Control::Jog(direction) => self.jog[direction_slot(direction)] = binding,
            Control::Shuttle(direction) => self.shuttle[direction_slot(direction)] = binding,
        }
    }

    /// Builder-style variant of [`Layer::set`]
    pub fn with(mut self, control: Control, binding: Binding) -> Self {
        self.set(control, binding);
        self
    }

    /// Iterate over every bound (control, binding) pair
    pub fn bound(&self) -> impl Iterator<Item = (Control, Binding)> + '_ {
        let buttons = PhysicalKey::all().map(Control::Button);
        let axes = [Direction::Clockwise, Direction::CounterClockwise]
            .into_iter()
            .flat_map(|d| [Control::Jog(d), Control::Shuttle(d)]);
        buttons
            .chain(axes)
            .map(move |control| (control, self.get(control)))
            .filter(|(_, binding)| !binding.is_unbound())
    }
}

/// Errors from validating a binding table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingTableError {
    #[error("base layer '{0}' must not have an activation key")]
    BaseLayerActivated(String),

    #[error("layer '{0}' has no activation key; only the base layer may be unconditional")]
    MissingActivation(String),

    #[error("{control} in layer '{layer}' references command {index}, but only {count} command(s) are configured")]
    InvalidCommandIndex {
        layer: String,
        control: String,
        index: usize,
        count: usize,
    },
}

/// Activation layers in priority order followed by exactly one base layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    layers: Vec<Layer>,
    base: Layer,
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::new(Vec::new(), Layer::base("base"))
    }
}

impl BindingTable {
    /// Create a table; `layers` are ordered highest priority first
    pub fn new(layers: Vec<Layer>, base: Layer) -> Self {
        Self { layers, base }
    }

    /// Activation layers, highest priority first
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The unconditional base layer
    pub fn base(&self) -> &Layer {
        &self.base
    }

    /// Check structural invariants and that every `Command` binding indexes
    /// into a command table of `command_count` entries.
    pub fn validate(&self, command_count: usize) -> Result<(), BindingTableError> {
        if self.base.activation.is_some() {
            return Err(BindingTableError::BaseLayerActivated(self.base.name.clone()));
        }
        for layer in &self.layers {
            if layer.activation.is_none() {
                return Err(BindingTableError::MissingActivation(layer.name.clone()));
            }
        }

        for layer in self.layers.iter().chain(std::iter::once(&self.base)) {
            for (control, binding) in layer.bound() {
                if let Binding::Command(index) = binding {
                    if index >= command_count {
                        return Err(BindingTableError::InvalidCommandIndex {
                            layer: layer.name.clone(),
                            control: control.to_string(),
                            index,
                            count: command_count,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Effective binding of `control` under the held-button mask.
    ///
    /// The first activation layer whose key is held and which binds the
    /// control wins; otherwise the base layer's binding is returned as is,
    /// even when it is `Unbound`.
    pub fn resolve(&self, control: Control, held: ButtonState) -> Binding {
        for layer in &self.layers {
            let Some(activation) = layer.activation else {
                continue;
            };
            if !held.is_held(activation) {
                continue;
            }
            let binding = layer.get(control);
            if !binding.is_unbound() {
                return binding;
            }
        }
        self.base.get(control)
    }

    /// Shorthand for resolving a physical button
    pub fn resolve_key(&self, key: PhysicalKey, held: ButtonState) -> Binding {
        self.resolve(Control::Button(key), held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Key;

    fn key(index: usize) -> PhysicalKey {
        PhysicalKey::new(index).unwrap()
    }

    fn mask(keys: &[usize]) -> ButtonState {
        keys.iter()
            .fold(ButtonState::empty(), |state, k| state.with(key(*k), true))
    }

    fn sample_table() -> BindingTable {
        let high = Layer::activated_by("high", key(10))
            .with(Control::Button(key(0)), Binding::KeyCode(Key::from(30)))
            .with(Control::Jog(Direction::Clockwise), Binding::KeyCode(Key::from(106)));
        let low = Layer::activated_by("low", key(9))
            .with(Control::Button(key(0)), Binding::KeyCode(Key::from(31)))
            .with(Control::Button(key(1)), Binding::PointerClick(3));
        let base = Layer::base("base")
            .with(Control::Button(key(0)), Binding::PointerClick(1))
            .with(Control::Jog(Direction::Clockwise), Binding::PointerClick(4));
        BindingTable::new(vec![high, low], base)
    }

    #[test]
    fn test_resolve_falls_back_to_base_when_nothing_held() {
        let table = sample_table();
        assert_eq!(table.resolve_key(key(0), mask(&[])), Binding::PointerClick(1));
        assert_eq!(table.resolve_key(key(5), mask(&[])), Binding::Unbound);
    }

    #[test]
    fn test_resolve_prefers_higher_priority_layer() {
        let table = sample_table();
        assert_eq!(
            table.resolve_key(key(0), mask(&[9, 10])),
            Binding::KeyCode(Key::from(30))
        );
        assert_eq!(
            table.resolve_key(key(0), mask(&[9])),
            Binding::KeyCode(Key::from(31))
        );
    }

    #[test]
    fn test_resolve_skips_unbound_override() {
        let table = sample_table();
        // "high" has nothing for K1, so "low" supplies it
        assert_eq!(table.resolve_key(key(1), mask(&[9, 10])), Binding::PointerClick(3));
        // "high" has nothing for K1 and "low" is not held: base (unbound)
        assert_eq!(table.resolve_key(key(1), mask(&[10])), Binding::Unbound);
    }

    #[test]
    fn test_resolve_axis_controls() {
        let table = sample_table();
        let cw = Control::Jog(Direction::Clockwise);
        assert_eq!(table.resolve(cw, mask(&[])), Binding::PointerClick(4));
        assert_eq!(table.resolve(cw, mask(&[10])), Binding::KeyCode(Key::from(106)));
        assert_eq!(
            table.resolve(Control::Jog(Direction::CounterClockwise), mask(&[10])),
            Binding::Unbound
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let table = sample_table();
        let before = table.clone();
        for _ in 0..3 {
            for k in PhysicalKey::all() {
                let held = mask(&[9, 10]);
                assert_eq!(table.resolve_key(k, held), before.resolve_key(k, held));
            }
        }
        assert_eq!(table, before);
    }

    #[test]
    fn test_validate_command_index() {
        let base = Layer::base("base").with(Control::Button(key(2)), Binding::Command(1));
        let table = BindingTable::new(vec![], base);
        assert!(table.validate(2).is_ok());
        assert_eq!(
            table.validate(1),
            Err(BindingTableError::InvalidCommandIndex {
                layer: "base".to_string(),
                control: "K2".to_string(),
                index: 1,
                count: 1,
            })
        );
    }

    #[test]
    fn test_validate_structure() {
        let unconditional = Layer::base("oops");
        let table = BindingTable::new(vec![unconditional], Layer::base("base"));
        assert_eq!(
            table.validate(0),
            Err(BindingTableError::MissingActivation("oops".to_string()))
        );

        let table = BindingTable::new(vec![], Layer::activated_by("base", key(3)));
        assert_eq!(
            table.validate(0),
            Err(BindingTableError::BaseLayerActivated("base".to_string()))
        );
    }

    #[test]
    fn test_layer_bound_lists_only_bound_controls() {
        let table = sample_table();
        let bound: Vec<_> = table.base().bound().collect();
        assert_eq!(bound.len(), 2);
        assert!(bound.contains(&(Control::Button(key(0)), Binding::PointerClick(1))));
    }
}
