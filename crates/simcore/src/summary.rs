//! Structured parameter summaries
//!
//! Every configured component can describe itself as plain data. The
//! reporting layer decides how (and whether) to print it.

use serde::Serialize;
use std::fmt;

/// One configured numeric parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: &'static str,
    pub value: f64,
    /// SI unit, empty for dimensionless quantities
    pub unit: &'static str,
}

/// Named group of parameters describing one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub title: String,
    pub parameters: Vec<Parameter>,
}

impl Summary {
    pub fn new(title: impl Into<String>) -> Self {
        Summary {
            title: title.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter (builder pattern)
    pub fn with(mut self, name: &'static str, value: f64, unit: &'static str) -> Self {
        self.parameters.push(Parameter { name, value, unit });
        self
    }

    /// Look up a parameter value by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.parameters.iter().find(|p| p.name == name).map(|p| p.value)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.title)?;
        for p in &self.parameters {
            if p.unit.is_empty() {
                writeln!(f, "    {}={}", p.name, p.value)?;
            } else {
                writeln!(f, "    {}={} {}", p.name, p.value, p.unit)?;
            }
        }
        Ok(())
    }
}

/// Components that can report their configured parameters.
pub trait Describe {
    fn describe(&self) -> Summary;
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe(&self) -> Summary {
        (**self).describe()
    }
}
