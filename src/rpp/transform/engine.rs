//! Script execution
//!
//!     Each run gets a freshly built Rhai engine. Nothing from the host is reachable from inside
//!     it except the two input constants and the helpers in [`super::helpers`]: there is no
//!     module loading, no `eval`, and `print`/`debug` only feed the host's tracing output.
//!
//!     A run is bounded by wall-clock time and by the operation and size limits in
//!     [`EngineLimits`]. The clock is checked from Rhai's progress callback, so a runaway loop is
//!     stopped from the host side.

use super::convert::{from_dynamic, to_dynamic};
use super::helpers;
use crate::rpp::chunk::Chunk;
use crate::rpp::document::TransformInputs;
use crate::rpp::error::{ProjectionError, ScriptError};
use crate::rpp::projection::{from_value, Value};
use rhai::module_resolvers::DummyModuleResolver;
use rhai::packages::{
    ArithmeticPackage, BasicArrayPackage, BasicFnPackage, BasicIteratorPackage, BasicMapPackage,
    BasicMathPackage, BasicStringPackage, LogicPackage, MoreStringPackage, Package,
};
use rhai::{Array, Dynamic, Engine, EvalAltResult, Map, Scope};
use std::time::{Duration, Instant};

/// Name the source projection is bound to inside scripts.
pub const SOURCE_BINDING: &str = "source";
/// Name the array of other projections is bound to inside scripts.
pub const OTHERS_BINDING: &str = "others";

/// How often (in operations) the progress callback looks at the clock.
const CLOCK_CHECK_INTERVAL: u64 = 1024;

/// Resource bounds for one run. Zero disables an operation or size limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLimits {
    pub timeout: Duration,
    pub max_operations: u64,
    pub max_call_levels: usize,
    pub max_expr_depth: usize,
    pub max_string_size: usize,
    pub max_array_size: usize,
    pub max_map_size: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        EngineLimits {
            timeout: Duration::from_secs(5),
            max_operations: 500_000_000,
            max_call_levels: 64,
            max_expr_depth: 128,
            max_string_size: 16 * 1024 * 1024,
            max_array_size: 1_000_000,
            max_map_size: 100_000,
        }
    }
}

/// One document produced by a script.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedDocument {
    pub name: String,
    pub root: Chunk,
}

/// Documents in the order the script returned them.
pub type TransformResult = Vec<TransformedDocument>;

#[derive(Debug, Clone, Default)]
pub struct TransformEngine {
    limits: EngineLimits,
}

impl TransformEngine {
    pub fn new(limits: EngineLimits) -> Self {
        TransformEngine { limits }
    }

    pub fn run_inputs(
        &self,
        script: &str,
        inputs: &TransformInputs,
    ) -> Result<TransformResult, ScriptError> {
        self.run(script, &inputs.source, &inputs.others)
    }

    /// Evaluate `script` once with `source` and `others` bound as constants.
    ///
    /// The script's value must be an array of `#{ name: "...", data: <chunk> }` maps.
    pub fn run(
        &self,
        script: &str,
        source: &Value,
        others: &[Value],
    ) -> Result<TransformResult, ScriptError> {
        let started = Instant::now();
        let engine = self.sandbox(started + self.limits.timeout);

        let ast = engine.compile(script).map_err(|err| ScriptError::Syntax {
            message: err.to_string(),
        })?;

        let mut scope = Scope::new();
        scope.push_constant(SOURCE_BINDING, to_dynamic(source));
        scope.push_constant(
            OTHERS_BINDING,
            Dynamic::from_array(others.iter().map(to_dynamic).collect()),
        );

        let outcome = engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
            .map_err(|err| self.script_error(&err))
            .and_then(collect_output);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(documents) => tracing::debug!(
                others = others.len(),
                outputs = documents.len(),
                elapsed_ms,
                "transform finished"
            ),
            Err(err) => tracing::debug!(%err, elapsed_ms, "transform failed"),
        }
        outcome
    }

    fn sandbox(&self, deadline: Instant) -> Engine {
        let limits = &self.limits;
        let mut engine = Engine::new_raw();

        // No `CorePackage`: its `sleep` blocks without ever reaching the progress callback.
        engine.register_global_module(ArithmeticPackage::new().as_shared_module());
        engine.register_global_module(LogicPackage::new().as_shared_module());
        engine.register_global_module(BasicStringPackage::new().as_shared_module());
        engine.register_global_module(BasicIteratorPackage::new().as_shared_module());
        engine.register_global_module(BasicFnPackage::new().as_shared_module());
        engine.register_global_module(BasicArrayPackage::new().as_shared_module());
        engine.register_global_module(BasicMapPackage::new().as_shared_module());
        engine.register_global_module(BasicMathPackage::new().as_shared_module());
        engine.register_global_module(MoreStringPackage::new().as_shared_module());
        helpers::register(&mut engine);

        engine.set_module_resolver(DummyModuleResolver::new());
        engine.disable_symbol("eval");

        engine
            .set_max_operations(limits.max_operations)
            .set_max_call_levels(limits.max_call_levels)
            .set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth)
            .set_max_string_size(limits.max_string_size)
            .set_max_array_size(limits.max_array_size)
            .set_max_map_size(limits.max_map_size);

        engine.on_print(|text| tracing::debug!(target: "reaproject::script", "{}", text));
        engine.on_debug(|text, _source, pos| {
            tracing::debug!(target: "reaproject::script", %pos, "{}", text)
        });
        engine.on_progress(move |operations| {
            if operations % CLOCK_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                Some(Dynamic::UNIT)
            } else {
                None
            }
        });

        engine
    }

    fn script_error(&self, err: &EvalAltResult) -> ScriptError {
        match root_cause(err) {
            EvalAltResult::ErrorTerminated(..) => ScriptError::Timeout {
                limit_ms: self.limits.timeout.as_millis() as u64,
            },
            EvalAltResult::ErrorRuntime(thrown, _) => ScriptError::Runtime {
                message: thrown_message(thrown),
            },
            _ => ScriptError::Runtime {
                message: err.to_string(),
            },
        }
    }
}

/// Errors raised inside script functions arrive wrapped once per call frame.
fn root_cause(err: &EvalAltResult) -> &EvalAltResult {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => root_cause(inner),
        EvalAltResult::ErrorInModule(_, inner, _) => root_cause(inner),
        other => other,
    }
}

/// `throw "text"` reports the text; `throw #{ message: ... }` reports the message field.
fn thrown_message(thrown: &Dynamic) -> String {
    if let Some(map) = thrown.clone().try_cast::<Map>() {
        if let Some(message) = map.get("message") {
            return message.to_string();
        }
    }
    thrown.to_string()
}

fn collect_output(result: Dynamic) -> Result<TransformResult, ScriptError> {
    let kind = result.type_name();
    let entries = result.try_cast::<Array>().ok_or_else(|| ScriptError::InvalidOutput {
        detail: format!("expected an array of documents, found {}", kind),
    })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            output_document(entry).map_err(|e| e.within(&format!("[{}]", index)).within("result"))
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(ScriptError::from)
}

fn output_document(entry: Dynamic) -> Result<TransformedDocument, ProjectionError> {
    let kind = entry.type_name();
    let mut map = entry.try_cast::<Map>().ok_or_else(|| {
        ProjectionError::new("", format!("expected #{{ name, data }}, found {}", kind))
    })?;

    let name = map
        .remove("name")
        .ok_or_else(|| ProjectionError::new("name", "missing"))?
        .into_string()
        .map_err(|kind| ProjectionError::new("name", format!("expected a string, found {}", kind)))?;
    if name.trim().is_empty() {
        return Err(ProjectionError::new("name", "must not be empty"));
    }

    let data = map
        .remove("data")
        .ok_or_else(|| ProjectionError::new("data", "missing"))?;
    if let Some(extra) = map.keys().next() {
        return Err(ProjectionError::new(extra.as_str(), "unknown field"));
    }

    let value = from_dynamic(data).map_err(|e| e.within("data"))?;
    let root = from_value(&value).map_err(|e| e.within("data"))?;
    Ok(TransformedDocument { name, root })
}
