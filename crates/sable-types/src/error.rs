//! Type system errors

use thiserror::Error;

/// Errors that can occur while registering classes in the type context
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// A class with the same name is already registered
    #[error("Duplicate class: {name}")]
    DuplicateClass {
        /// Name of the class
        name: String,
    },

    /// A generic class was instantiated with the wrong number of arguments
    #[error("Invalid type argument count for {class}: expected {expected}, got {actual}")]
    InvalidTypeArgCount {
        /// Name of the generic class
        class: String,
        /// Expected count
        expected: usize,
        /// Actual count
        actual: usize,
    },

    /// A declared base is not a class instance type
    #[error("Invalid base for class {class}: {reason}")]
    InvalidBase {
        /// Name of the class being registered
        class: String,
        /// Reason for invalidity
        reason: String,
    },

    /// A declared duck type alias is not a class instance type
    #[error("Invalid duck type alias for class {class}: {reason}")]
    InvalidDucktype {
        /// Name of the class being registered
        class: String,
        /// Reason for invalidity
        reason: String,
    },
}
