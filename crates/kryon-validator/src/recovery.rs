/// How the validator reacts to a finding (§4.5). Default is `Skip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Stop at the first diagnostic; caller decides whether to keep going.
    None,
    /// Drop the offending node/property and continue.
    #[default]
    Skip,
    /// Replace the offending value with a type-appropriate default.
    Default,
    /// Clamp the offending value into its valid range instead of dropping it.
    Sanitize,
}
