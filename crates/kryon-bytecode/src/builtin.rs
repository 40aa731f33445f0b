//! Reserved host-function ids the bytecode compiler lowers certain
//! expression forms to. These aren't user-registered host functions — the
//! VM's default host registry (`kryon-vm`) implements them natively so
//! every compiled unit can rely on them without an explicit `@host` decl.

/// `(value, member_name) -> value`
pub const MEMBER_ACCESS_HOST_ID: u32 = 0;
/// `(array, index) -> value`
pub const ARRAY_INDEX_HOST_ID: u32 = 1;
/// `(value) -> string`, used to coerce template segments to text.
pub const STRINGIFY_HOST_ID: u32 = 2;
