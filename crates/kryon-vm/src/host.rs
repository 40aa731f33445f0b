use std::collections::HashMap;

use tracing::warn;

use crate::error::VmError;
use crate::value::RuntimeValue;

type HostFn = Box<dyn Fn(&[RuntimeValue]) -> RuntimeValue + Send + Sync>;

struct Entry {
    arity: usize,
    f: HostFn,
}

/// The guest/host bridge (§6): a table of native functions addressed by id,
/// each either required (missing → `HostMissing` trap) or optional (missing
/// → warn and yield `Null`, no trap). `CallHost` doesn't encode an arity
/// itself, so the registry tracks how many operands each id expects.
pub struct HostRegistry {
    functions: HashMap<u32, Entry>,
    required: HashMap<u32, String>,
    names: HashMap<u32, String>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self { functions: HashMap::new(), required: HashMap::new(), names: HashMap::new() }
    }

    /// Registers the three VM-builtin ids the bytecode compiler lowers
    /// member access, array indexing, and template stringification to.
    /// These are scalar-only best effort: member/array access on a runtime
    /// value that isn't itself a compound has nothing to look up, so they
    /// yield `Null` (handler locals are scalar-only by design, see
    /// `kryon-bytecode`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(kryon_bytecode::MEMBER_ACCESS_HOST_ID, "__member_access", true, 2, |_args| RuntimeValue::Null);
        registry.register(kryon_bytecode::ARRAY_INDEX_HOST_ID, "__array_index", true, 2, |_args| RuntimeValue::Null);
        registry.register(kryon_bytecode::STRINGIFY_HOST_ID, "__stringify", true, 1, |args| {
            args.first().cloned().unwrap_or(RuntimeValue::Null)
        });
        registry
    }

    /// Records every declared host function's name and required-ness from
    /// the IR's registry (§6), without supplying an implementation. A
    /// required id with no later `register()` call traps with
    /// `HostMissing`; an optional one warns and yields `Null` (§8 Scenario
    /// E: missing non-required host function).
    pub fn declare_from_ir(&mut self, ir: &kryon_ir::Ir) {
        for decl in &ir.host_functions {
            let name = ir.strings.get(decl.name_index).unwrap_or("").to_string();
            if decl.required {
                self.required.insert(decl.id, name.clone());
            }
            self.names.insert(decl.id, name);
        }
    }

    pub fn register(
        &mut self,
        id: u32,
        name: impl Into<String>,
        required: bool,
        arity: usize,
        f: impl Fn(&[RuntimeValue]) -> RuntimeValue + Send + Sync + 'static,
    ) {
        let name = name.into();
        if required {
            self.required.insert(id, name.clone());
        }
        self.names.insert(id, name);
        self.functions.insert(id, Entry { arity, f: Box::new(f) });
    }

    /// Operand count the VM should pop before calling `id`. `0` for an
    /// unregistered id, since the VM is about to trap or warn rather than
    /// invoke anything.
    pub fn arity(&self, id: u32) -> usize {
        self.functions.get(&id).map(|e| e.arity).unwrap_or(0)
    }

    pub fn call(&self, id: u32, args: &[RuntimeValue]) -> Result<RuntimeValue, VmError> {
        match self.functions.get(&id) {
            Some(entry) => Ok((entry.f)(args)),
            None => match self.required.get(&id) {
                Some(name) => Err(VmError::HostMissing(name.clone())),
                None => {
                    let name = self.names.get(&id).cloned().unwrap_or_else(|| id.to_string());
                    warn!(host_id = id, host_name = %name, "missing optional host function, yielding null");
                    Ok(RuntimeValue::Null)
                }
            },
        }
    }
}

impl Default for HostRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
