//! Spelling of the constructs the migration introduces.

use serde::{Deserialize, Serialize};

/// Names used when rendering owning replacements.
///
/// The defaults target a `boost::shared_ptr` based support library whose
/// deleter lives in `tools.h`:
///
/// ```text
/// boost::shared_ptr<T>                 owning type
/// util::deleter<T>()                   deleter instance
/// util::deleter<T>::delete_ptr(name)   explicit release
/// #include "tools.h"                   preamble
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteOptions {
    /// Owning smart-pointer template, instantiated as `owning_type<T>`.
    pub owning_type: String,
    /// Deleter template, instantiated as `deleter_type<T>`.
    pub deleter_type: String,
    /// Static member of the deleter that releases a pointer.
    pub release_function: String,
    /// Header declaring the owning and deleter templates.
    pub support_header: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            owning_type: "boost::shared_ptr".to_owned(),
            deleter_type: "util::deleter".to_owned(),
            release_function: "delete_ptr".to_owned(),
            support_header: "tools.h".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_keep_defaults() {
        let options: RewriteOptions =
            serde_json::from_str(r#"{"owning_type":"std::shared_ptr"}"#).expect("options");
        assert_eq!(options.owning_type, "std::shared_ptr");
        assert_eq!(options.deleter_type, "util::deleter");
        assert_eq!(options.support_header, "tools.h");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = serde_json::from_str::<RewriteOptions>(r#"{"owner":"x"}"#);
        assert!(result.is_err());
    }
}
