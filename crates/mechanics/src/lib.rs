pub mod rotor;

pub use rotor::{MechanicalParameters, MechanicalState, Mechanics};
