//! Top-level entry points tying the whole pipeline together (§2): source
//! text through the lexer, a chosen frontend parser, the IR builder, the
//! semantic validator, and the bytecode compiler — or the reverse, a `.krb`
//! or `.kir` file back through the source printer.

mod error;

use kryon_ast::{CurlyParser, FrontendParser, SexprParser};
use kryon_ir::{BuildOptions, Ir};
use kryon_validator::RecoveryMode;

pub use error::KryonError;
pub use kryon_binary::{VERSION_MAJOR as BINARY_VERSION_MAJOR, VERSION_MINOR as BINARY_VERSION_MINOR};
pub use kryon_ir::IrDiagnostic;
pub use kryon_kir::Metadata as KirMetadata;
pub use kryon_printer::Flavor;
pub use kryon_validator::ValidationDiagnostic;

/// Which concrete frontend grammar to parse source text with (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    Curly,
    Sexpr,
}

impl Frontend {
    fn parser(self) -> Box<dyn FrontendParser> {
        match self {
            Frontend::Curly => Box::new(CurlyParser),
            Frontend::Sexpr => Box::new(SexprParser),
        }
    }
}

/// Knobs for a single [`compile`] call.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub file: String,
    pub frontend: Frontend,
    pub recovery_mode: RecoveryMode,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { file: "<input>".to_string(), frontend: Frontend::Curly, recovery_mode: RecoveryMode::default() }
    }
}

/// Everything produced by a successful [`compile`] call: the finished IR
/// plus every non-fatal diagnostic recorded along the way (empty on a
/// clean compile).
#[derive(Debug)]
pub struct CompileOutput {
    pub ir: Ir,
    pub build_diagnostics: Vec<IrDiagnostic>,
    pub validation_diagnostics: Vec<ValidationDiagnostic>,
}

/// Runs source text through the full front half of the pipeline: lex,
/// parse, build the IR, validate it, and lower every bytecode-backed
/// handler (§4.1-§4.6). Fails closed — any `error`-severity diagnostic
/// still present after the validator has had a chance to recover aborts
/// the compile (§7) rather than handing back a half-built IR.
pub fn compile(source: &str, options: CompileOptions) -> Result<CompileOutput, KryonError> {
    let tokens = kryon_lexer::lex(source).map_err(KryonError::Lexical)?;

    let parser = options.frontend.parser();
    let (ast, _parse_diagnostics) = parser.parse(tokens, &options.file);

    let (mut ir, build_diagnostics) =
        kryon_ir::build(&ast, BuildOptions { file: options.file.clone(), recovery_mode: true });
    if has_build_errors(&build_diagnostics) {
        return Err(KryonError::Build(build_diagnostics));
    }

    let validation_diagnostics = kryon_validator::validate(&mut ir, options.recovery_mode);
    if has_validation_errors(&validation_diagnostics) {
        return Err(KryonError::Validate(validation_diagnostics));
    }

    kryon_bytecode::compile_functions(&mut ir)?;

    Ok(CompileOutput { ir, build_diagnostics, validation_diagnostics })
}

fn has_build_errors(diagnostics: &[IrDiagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == kryon_ir::Severity::Error)
}

fn has_validation_errors(diagnostics: &[ValidationDiagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == kryon_validator::Severity::Error)
}

/// Serializes a built [`Ir`] to its compact binary form (§4.7).
pub fn to_binary(ir: &Ir) -> Vec<u8> {
    kryon_binary::write(ir)
}

/// Parses a `.krb` file back into an [`Ir`] (§4.8).
pub fn from_binary(bytes: &[u8]) -> Result<Ir, KryonError> {
    kryon_binary::read(bytes).map_err(KryonError::from)
}

/// Serializes a built [`Ir`] to the canonical `.kir` JSON form (§4.9).
pub fn to_kir(ir: &Ir, metadata: KirMetadata) -> Result<String, KryonError> {
    kryon_kir::to_json(ir, metadata).map_err(KryonError::from)
}

/// Parses a `.kir` document back into an [`Ir`].
pub fn from_kir(json: &str) -> Result<Ir, KryonError> {
    kryon_kir::from_json(json).map_err(KryonError::from)
}

/// Decompiles a `.krb` file straight to source text in the requested
/// [`Flavor`] (§4.8 + §4.10 composed).
pub fn decompile(bytes: &[u8], flavor: Flavor) -> Result<String, KryonError> {
    let ir = from_binary(bytes)?;
    kryon_printer::print(&ir, flavor).map_err(KryonError::from)
}

/// Round-trips source text through the full pipeline and back out as
/// source text: `compile` then `print` (§8 invariant 3 — semantic
/// round-trip; whitespace/comments may differ from the input).
pub fn reprint(source: &str, options: CompileOptions, flavor: Flavor) -> Result<String, KryonError> {
    let output = compile(source, options)?;
    kryon_printer::print(&output.ir, flavor).map_err(KryonError::from)
}
