//! End-to-end scenarios for the full lex → parse → build → validate →
//! compile pipeline, and its inverses (binary round-trip, decompilation).

use kryon_compiler::{compile, decompile, from_binary, reprint, to_binary, to_kir, CompileOptions, Flavor, Frontend, KirMetadata};
use kryon_ir::{ExpansionInfo, Instruction, StateType, Value};
use kryon_validator::{RecoveryMode, ValidateErrorKind};
use kryon_vm::{HostRegistry, RuntimeValue, StateTable, Vm, VmConfig};

fn opts() -> CompileOptions {
    CompileOptions { file: "<test>".to_string(), frontend: Frontend::Curly, recovery_mode: RecoveryMode::Skip }
}

/// Scenario A — minimal button with bytecode increment (§8).
#[test]
fn scenario_a_minimal_button_with_bytecode_increment() {
    let source = r#"
        @var count = 0
        Button { text = "+"; onClick { count = count + 1 } }
    "#;
    let output = compile(source, opts()).expect("should compile cleanly");
    let ir = output.ir;

    assert_eq!(ir.root.len(), 1);
    assert_eq!(ir.strings.get(ir.root[0].element_type_index), Some("Button"));

    assert_eq!(ir.states.len(), 1);
    assert_eq!(ir.strings.get(ir.states[0].name_index), Some("count"));
    assert_eq!(ir.states[0].value_type, StateType::Int);
    assert_eq!(ir.states[0].initial, Value::Int(0));

    assert_eq!(ir.functions.len(), 1);
    assert_eq!(
        ir.functions[0].instructions,
        vec![Instruction::GetState(0), Instruction::PushInt(1), Instruction::Add, Instruction::SetState(0), Instruction::Halt]
    );

    let bytes = to_binary(&ir);
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("KRBY"));
    assert!(text.contains("SCPT"));
    assert!(text.contains("FUNC"));

    let mut state = StateTable::new(vec![RuntimeValue::Int(0)]);
    let notified = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
    let notified_clone = notified.clone();
    state.subscribe(move |_, _| {
        notified_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    });
    let host = HostRegistry::with_builtins();
    let mut strings = ir.strings.clone();
    {
        let mut vm = Vm::new(&host, &mut state, &mut strings, VmConfig::default());
        vm.run(&ir.functions, ir.functions[0].function_id, vec![]).expect("handler should run cleanly");
    }
    assert_eq!(state.get(0), RuntimeValue::Int(1));
    assert_eq!(notified.load(std::sync::atomic::Ordering::SeqCst), 1);
}

/// Scenario B — `@const_for` expansion (§8).
#[test]
fn scenario_b_const_for_expansion() {
    let source = r#"
        const { colors = ["red", "green", "blue"]; }
        @const_for(c in colors) {
            Button { text = c; backgroundColor = c; }
        }
    "#;
    let output = compile(source, opts()).expect("should compile cleanly");
    let ir = output.ir;

    assert_eq!(ir.root.len(), 3);
    let expected = ["red", "green", "blue"];
    for (i, button) in ir.root.iter().enumerate() {
        assert_eq!(button.expansion, Some(ExpansionInfo::ConstFor { iteration: i as u32 }));
        let text_index = button.properties.keys().find(|k| ir.strings.get(**k) == Some("text")).unwrap();
        match &button.properties[text_index] {
            kryon_ir::Expression::Literal(Value::String(idx)) => {
                assert_eq!(ir.strings.get(*idx), Some(expected[i]));
            }
            other => panic!("expected a string literal, got {other:?}"),
        }
    }

    let printed = reprint(source, opts(), Flavor::Curly).expect("should print cleanly");
    let output2 = compile(&printed, opts()).expect("printed source should recompile");
    assert_eq!(output2.ir.root.len(), 3);
}

/// Scenario C (strict half) — a style `extends` cycle is rejected rather
/// than silently producing a usable IR.
#[test]
fn scenario_c_strict_style_cycle_is_rejected() {
    let source = r#"
        style a extends b { width = 1px; }
        style b extends a { width = 2px; }
        Button { }
    "#;
    let options = CompileOptions { recovery_mode: RecoveryMode::None, ..opts() };
    let err = compile(source, options).expect_err("a style extends cycle must not compile");
    match err {
        kryon_compiler::KryonError::Validate(diags) => {
            assert!(diags.iter().any(|d| d.kind == ValidateErrorKind::StyleCycle));
        }
        other => panic!("expected a Validate error, got {other:?}"),
    }
}

/// Scenario D — binary round-trip is byte-for-byte and element-for-element
/// stable.
#[test]
fn scenario_d_binary_round_trip_is_exact() {
    let source = r#"
        @var count = 0
        Button { text = "+"; onClick { count = count + 1 } }
    "#;
    let output = compile(source, opts()).expect("should compile cleanly");
    let bytes = to_binary(&output.ir);
    let decoded = from_binary(&bytes).expect("should decode the file it just wrote");
    let bytes2 = to_binary(&decoded);
    assert_eq!(bytes, bytes2, "re-serializing a decoded IR must reproduce the same bytes");

    assert_eq!(decoded.root.len(), output.ir.root.len());
    assert_eq!(decoded.states.len(), output.ir.states.len());
    assert_eq!(decoded.functions.len(), output.ir.functions.len());
    assert_eq!(decoded.functions[0].instructions, output.ir.functions[0].instructions);
    assert_eq!(
        decoded.strings.get(decoded.root[0].element_type_index),
        output.ir.strings.get(output.ir.root[0].element_type_index)
    );
}

/// Scenario E — a bytecode call to a declared-but-unregistered, non-required
/// host function warns and yields null rather than trapping, and that
/// behavior survives a binary round-trip.
#[test]
fn scenario_e_missing_non_required_host_function_does_not_trap() {
    let mut ir = kryon_ir::Ir::empty();
    let name = ir.strings.intern("formatCurrency");
    ir.host_functions.push(kryon_ir::HostFunctionDecl { id: 100, name_index: name, signature_index: 0, required: false });
    ir.states.push(kryon_ir::StateCell {
        state_id: 0,
        name_index: ir.strings.intern("label"),
        value_type: StateType::String,
        initial: Value::String(ir.strings.intern("")),
    });
    ir.functions.push(kryon_ir::Function {
        function_id: 0,
        name_index: ir.strings.intern("format"),
        language_tag_index: 0,
        param_indices: Vec::new(),
        code_index: 0,
        instructions: vec![Instruction::GetState(0), Instruction::CallHost(100), Instruction::Halt],
    });

    let bytes = to_binary(&ir);
    let decoded = from_binary(&bytes).expect("round-trips cleanly");

    let mut host = HostRegistry::new();
    host.declare_from_ir(&decoded);
    let mut state = StateTable::new(vec![RuntimeValue::Str(0)]);
    let mut strings = decoded.strings.clone();
    let mut vm = Vm::new(&host, &mut state, &mut strings, VmConfig::default());
    let result = vm.run(&decoded.functions, 0, vec![]);
    assert!(result.is_ok(), "a non-required missing host function must not trap: {result:?}");
}

/// Scenario F — explicit px units and hex colors survive a binary
/// round-trip bit-for-bit.
#[test]
fn scenario_f_unit_and_color_round_trip() {
    let source = r#"Panel { width = 100px; background_color = #FF8800; }"#;
    let output = compile(source, opts()).expect("should compile cleanly");
    let ir = output.ir;

    let panel = &ir.root[0];
    let width_index = panel.properties.keys().find(|k| ir.strings.get(**k) == Some("width")).unwrap();
    assert_eq!(panel.properties[width_index], kryon_ir::Expression::Literal(Value::Unit(100.0, kryon_ir::Unit::Px)));

    let color_index = panel.properties.keys().find(|k| ir.strings.get(**k) == Some("background_color")).unwrap();
    assert_eq!(panel.properties[color_index], kryon_ir::Expression::Literal(Value::Color(0xFF, 0x88, 0x00, 0xFF)));

    let bytes = to_binary(&ir);
    let decoded = from_binary(&bytes).expect("round-trips cleanly");
    assert_eq!(to_binary(&decoded), bytes);
}

/// Boundary behavior — empty source yields an IR with zero root elements
/// and the smallest possible valid binary.
#[test]
fn empty_source_yields_empty_ir_and_minimal_binary() {
    let output = compile("", opts()).expect("empty source is valid");
    assert!(output.ir.root.is_empty());

    let bytes = to_binary(&output.ir);
    assert!(from_binary(&bytes).is_ok());
    assert!(bytes.len() < 128, "an empty IR's binary should be near the fixed header size, got {} bytes", bytes.len());

    let metadata = KirMetadata::default();
    let json = to_kir(&output.ir, metadata).expect("empty IR serializes to kir");
    assert!(json.contains("\"type\": \"ROOT\""));
}

/// Boundary behavior — a style inheritance chain of length N resolves
/// correctly regardless of depth (§8 "style chain O(N)").
#[test]
fn deep_style_chain_resolves_all_the_way_to_the_root() {
    let mut source = String::new();
    source.push_str("style s0 { width = 1px; }\n");
    for i in 1..32 {
        source.push_str(&format!("style s{i} extends s{prev} {{ }}\n", prev = i - 1));
    }
    source.push_str("Panel { style = \"s31\"; }\n");

    let output = compile(&source, opts()).expect("a long acyclic extends chain must compile");
    let leaf_index = output.ir.strings.iter().position(|s| s == "s31").expect("s31 interned") as kryon_ir::StringIndex;
    let resolved = output.ir.resolve_style(leaf_index).expect("no cycle");
    assert_eq!(resolved.len(), 1, "only s0 ever sets a property; the chain should resolve it through all 31 hops");
}

/// Decompiling a freshly compiled `.krb` back to curly-flavored source text
/// recovers the element tree and the event wiring, even though the
/// decompiled function body is re-derived from bytecode rather than the
/// original handler text.
#[test]
fn decompiling_a_compiled_artifact_recovers_the_element_and_event_wiring() {
    let source = r#"
        @var count = 0
        Button { text = "+"; onClick { count = count + 1 } }
    "#;
    let output = compile(source, opts()).expect("should compile cleanly");
    let bytes = to_binary(&output.ir);

    let decompiled = decompile(&bytes, Flavor::Curly).expect("should decompile cleanly");
    assert!(decompiled.contains("Button"));
    assert!(decompiled.contains("onClick"));
    assert!(decompiled.contains("state count: Int = 0;"));

    let recompiled = compile(&decompiled, opts()).expect("decompiled source should recompile");
    assert_eq!(recompiled.ir.root.len(), output.ir.root.len());
    assert_eq!(recompiled.ir.states.len(), output.ir.states.len());
}

/// Boundary behavior — integer overflow wraps two's-complement rather than
/// panicking or trapping, for a handler compiled through the full pipeline
/// (not just constructed by hand, see `kryon-vm`'s own unit test for the
/// VM-level version of this check).
#[test]
fn integer_overflow_wraps_through_the_full_pipeline() {
    let source = r#"
        @var total = 0
        Button { onClick { total = total + 1 } }
    "#;
    let output = compile(source, opts()).expect("should compile cleanly");
    let mut state = StateTable::new(vec![RuntimeValue::Int(i64::MAX)]);
    let host = HostRegistry::with_builtins();
    let mut strings = output.ir.strings.clone();
    let mut vm = Vm::new(&host, &mut state, &mut strings, VmConfig::default());
    vm.run(&output.ir.functions, output.ir.functions[0].function_id, vec![]).expect("should run cleanly");
    assert_eq!(state.get(0), RuntimeValue::Int(i64::MIN));
}
