//! The embedded bytecode virtual machine (§4.11): a single-threaded,
//! cooperatively-scheduled stack machine that executes `Function`s compiled
//! by `kryon-bytecode` against a shared reactive state table and a
//! host-function bridge (§6).

mod error;
mod host;
mod state;
mod value;
mod vm;

pub use error::VmError;
pub use host::HostRegistry;
pub use state::StateTable;
pub use value::RuntimeValue;
pub use vm::{Vm, VmConfig};

#[cfg(test)]
mod tests {
    use kryon_ir::{Function, Instruction};

    use super::*;

    fn make_function(function_id: u32, instructions: Vec<Instruction>) -> Function {
        Function { function_id, name_index: 0, language_tag_index: 0, param_indices: vec![], code_index: 0, instructions }
    }

    #[test]
    fn increment_handler_commits_state_after_halt() {
        let functions = vec![make_function(
            0,
            vec![
                Instruction::GetState(0),
                Instruction::PushInt(1),
                Instruction::Add,
                Instruction::SetState(0),
                Instruction::Halt,
            ],
        )];
        let mut state = StateTable::new(vec![RuntimeValue::Int(0)]);
        let host = HostRegistry::with_builtins();
        let mut strings = kryon_ir::StringTable::new();
        {
            let mut vm = Vm::new(&host, &mut state, &mut strings, VmConfig::default());
            vm.run(&functions, 0, vec![]).unwrap();
        }
        assert_eq!(state.get(0), RuntimeValue::Int(1));
    }

    #[test]
    fn int_division_by_zero_traps() {
        let functions =
            vec![make_function(0, vec![Instruction::PushInt(1), Instruction::PushInt(0), Instruction::Div, Instruction::Halt])];
        let mut state = StateTable::new(vec![]);
        let host = HostRegistry::with_builtins();
        let mut strings = kryon_ir::StringTable::new();
        let mut vm = Vm::new(&host, &mut state, &mut strings, VmConfig::default());
        let result = vm.run(&functions, 0, vec![]);
        assert_eq!(result, Err(VmError::DivByZero));
    }

    #[test]
    fn int_overflow_wraps_rather_than_panics() {
        let functions = vec![make_function(
            0,
            vec![Instruction::PushInt(i64::MAX), Instruction::PushInt(1), Instruction::Add, Instruction::SetState(0), Instruction::Halt],
        )];
        let mut state = StateTable::new(vec![RuntimeValue::Int(0)]);
        let host = HostRegistry::with_builtins();
        let mut strings = kryon_ir::StringTable::new();
        let mut vm = Vm::new(&host, &mut state, &mut strings, VmConfig::default());
        vm.run(&functions, 0, vec![]).unwrap();
        assert_eq!(state.get(0), RuntimeValue::Int(i64::MIN));
    }

    #[test]
    fn missing_optional_host_function_warns_and_yields_null_without_trapping() {
        let functions = vec![make_function(0, vec![Instruction::CallHost(999), Instruction::Pop, Instruction::Halt])];
        let mut state = StateTable::new(vec![]);
        let host = HostRegistry::with_builtins();
        let mut strings = kryon_ir::StringTable::new();
        let mut vm = Vm::new(&host, &mut state, &mut strings, VmConfig::default());
        assert!(vm.run(&functions, 0, vec![]).is_ok());
    }

    #[test]
    fn missing_required_host_function_traps() {
        // Declared in the IR as required, but never registered with a real
        // implementation — the embedder never supplied one.
        let mut ir = kryon_ir::Ir::empty();
        let name = ir.strings.intern("mustExist");
        ir.host_functions.push(kryon_ir::HostFunctionDecl { id: 42, name_index: name, signature_index: 0, required: true });
        let mut host = HostRegistry::new();
        host.declare_from_ir(&ir);

        let functions = vec![make_function(0, vec![Instruction::CallHost(42), Instruction::Pop, Instruction::Halt])];
        let mut state = StateTable::new(vec![]);
        let mut strings = kryon_ir::StringTable::new();
        let mut vm = Vm::new(&host, &mut state, &mut strings, VmConfig::default());
        let result = vm.run(&functions, 0, vec![]);
        assert!(matches!(result, Err(VmError::HostMissing(_))));
    }

    #[test]
    fn instruction_budget_exceeded_traps() {
        let functions = vec![make_function(0, vec![Instruction::PushInt(1), Instruction::Jump(-1)])];
        let mut state = StateTable::new(vec![]);
        let host = HostRegistry::with_builtins();
        let mut strings = kryon_ir::StringTable::new();
        let config = VmConfig { instruction_budget: Some(10), ..VmConfig::default() };
        let mut vm = Vm::new(&host, &mut state, &mut strings, config);
        let result = vm.run(&functions, 0, vec![]);
        assert_eq!(result, Err(VmError::InstructionBudgetExceeded(10)));
    }

    #[test]
    fn string_comparison_is_lexicographic_not_always_true() {
        let mut strings = kryon_ir::StringTable::new();
        let a = strings.intern("a");
        let b = strings.intern("b");
        let functions = vec![make_function(
            0,
            vec![Instruction::PushString(b), Instruction::PushString(a), Instruction::Le, Instruction::SetState(0), Instruction::Halt],
        )];
        let mut state = StateTable::new(vec![RuntimeValue::Null]);
        let host = HostRegistry::with_builtins();
        let mut vm = Vm::new(&host, &mut state, &mut strings, VmConfig::default());
        vm.run(&functions, 0, vec![]).unwrap();
        assert_eq!(state.get(0), RuntimeValue::Bool(false), "\"b\" <= \"a\" must be false, not vacuously true");
    }

    #[test]
    fn template_concatenation_interns_a_new_string() {
        let mut strings = kryon_ir::StringTable::new();
        let hello = strings.intern("count: ");
        let functions = vec![make_function(
            0,
            vec![Instruction::PushString(hello), Instruction::PushInt(5), Instruction::Concat, Instruction::SetState(0), Instruction::Halt],
        )];
        let mut state = StateTable::new(vec![RuntimeValue::Null]);
        let host = HostRegistry::with_builtins();
        let mut vm = Vm::new(&host, &mut state, &mut strings, VmConfig::default());
        vm.run(&functions, 0, vec![]).unwrap();
        match state.get(0) {
            RuntimeValue::Str(idx) => assert_eq!(strings.get(idx), Some("count: 5")),
            other => panic!("expected a string, got {other:?}"),
        }
    }
}
