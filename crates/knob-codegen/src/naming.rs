//! Identifiers shared by the declaration, definition, and profile headers.
//!
//! Every generated symbol is spelled once here in generic form and passed
//! through [`Dialect::rename`], so the three artifacts always agree.

use crate::dialect::Dialect;

/// Dialect-specific spelling of every fixed generated identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    // Types
    pub knob_type: String,
    pub statistics_type: String,
    pub validation_fn_type: String,
    pub data_type: String,
    pub override_type: String,
    pub profile_type: String,
    pub values_type: String,
    pub guid_type: String,

    // Function and variable prefixes
    pub getter_prefix: String,
    pub setter_prefix: String,
    pub enum_validator_prefix: String,
    pub content_validator_prefix: String,
    pub no_constraints_fn: String,
    pub get_value_fn: String,
    pub set_value_fn: String,
    pub defaults_var: String,
    pub cache_var: String,
    pub data_var: String,
    pub profiles_var: String,

    // Parameters and fields
    pub value: String,
    pub buffer: String,
    pub knob: String,
    pub numeric_value: String,
    pub overrides: String,
    pub override_count: String,

    // Per-profile name parts
    profile_type_prefix: String,
    profile_type_suffix: String,
    profile_var_prefix: String,
    profile_data_suffix: String,
    profile_overrides_suffix: String,
}

impl Naming {
    pub fn new(dialect: &dyn Dialect) -> Self {
        let ty = |name: &str| dialect.rename(name, true);
        let id = |name: &str| dialect.rename(name, false);
        Self {
            knob_type: ty("knob_t"),
            statistics_type: ty("knob_statistics_t"),
            validation_fn_type: ty("knob_validation_fn"),
            data_type: ty("knob_data_t"),
            override_type: ty("knob_override_t"),
            profile_type: ty("profile_t"),
            values_type: ty("knob_values_t"),
            guid_type: dialect.type_name("config_guid_t").to_string(),

            getter_prefix: id("config_get_"),
            setter_prefix: id("config_set_"),
            enum_validator_prefix: id("validate_enum_value_"),
            content_validator_prefix: id("validate_knob_content_"),
            no_constraints_fn: id("validate_knob_no_constraints"),
            get_value_fn: id("get_knob_value"),
            set_value_fn: id("set_knob_value"),
            defaults_var: format!("g{}", id("_knob_default_values")),
            cache_var: format!("g{}", id("_knob_cached_values")),
            data_var: format!("g{}", id("_knob_data")),
            profiles_var: id("profiles"),

            value: id("value"),
            buffer: id("buffer"),
            knob: id("knob"),
            numeric_value: id("numeric_value"),
            overrides: id("overrides"),
            override_count: id("override_count"),

            profile_type_prefix: ty("profile_"),
            profile_type_suffix: ty("_data_t"),
            profile_var_prefix: id("profile_"),
            profile_data_suffix: id("_data"),
            profile_overrides_suffix: id("_overrides"),
        }
    }

    /// Knob identity enumerator: `KNOB_<name>`.
    pub fn knob_id(&self, knob: &str) -> String {
        format!("KNOB_{knob}")
    }

    /// Terminating identity value.
    pub fn knob_max(&self) -> &'static str {
        "KNOB_MAX"
    }

    /// Bound macro for a leaf: `KNOB__<define>__MIN` / `__MAX`.
    pub fn bound_define(&self, define_name: &str, upper: bool) -> String {
        let which = if upper { "MAX" } else { "MIN" };
        format!("KNOB__{define_name}__{which}")
    }

    /// Value struct type holding one profile's overridden knobs.
    pub fn profile_data_type(&self, profile: &str) -> String {
        format!(
            "{}{profile}{}",
            self.profile_type_prefix, self.profile_type_suffix
        )
    }

    /// Instance of [`Naming::profile_data_type`].
    pub fn profile_data_var(&self, profile: &str) -> String {
        format!(
            "{}{profile}{}",
            self.profile_var_prefix, self.profile_data_suffix
        )
    }

    /// Sentinel-terminated override array of one profile.
    pub fn profile_overrides_var(&self, profile: &str) -> String {
        format!(
            "{}{profile}{}",
            self.profile_var_prefix, self.profile_overrides_suffix
        )
    }

    /// Macro prefix for a profile: `PROFILE_<NAME>`.
    pub fn profile_macro(&self, profile: &str) -> String {
        format!("PROFILE_{}", profile.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Firmware, Generic};

    #[test]
    fn generic_names() {
        let n = Naming::new(&Generic);
        assert_eq!(n.knob_type, "knob_t");
        assert_eq!(n.defaults_var, "g_knob_default_values");
        assert_eq!(n.getter_prefix, "config_get_");
        assert_eq!(n.guid_type, "config_guid_t");
        assert_eq!(n.profile_data_type("server"), "profile_server_data_t");
        assert_eq!(n.profile_data_var("server"), "profile_server_data");
        assert_eq!(n.profile_overrides_var("server"), "profile_server_overrides");
        assert_eq!(n.profile_macro("server"), "PROFILE_SERVER");
    }

    #[test]
    fn firmware_names() {
        let n = Naming::new(&Firmware);
        assert_eq!(n.knob_type, "KNOB");
        assert_eq!(n.data_type, "KNOB_DATA");
        assert_eq!(n.defaults_var, "gKnobDefaultValues");
        assert_eq!(n.getter_prefix, "ConfigGet");
        assert_eq!(n.content_validator_prefix, "ValidateKnobContent");
        assert_eq!(n.value, "Value");
        assert_eq!(n.guid_type, "EFI_GUID");
        assert_eq!(n.bound_define("fan__mode", true), "KNOB__fan__mode__MAX");
        assert_eq!(n.profile_data_type("server"), "PROFILE_server_DATA");
        assert_eq!(n.profile_data_var("server"), "ProfileserverData");
        assert_eq!(n.profile_overrides_var("server"), "ProfileserverOverrides");
    }
}
