//! Call-site marshaling.
//!
//! A [`Marshaller`] turns one parameter (or the return value) into the code
//! around a native call: statements that run before it, the expression passed
//! as the argument, and statements that copy results back afterwards.
//! [`plan_call`] runs it over a whole method.

use crate::error::{GenError, Result};
use crate::model::{Direction, MethodDecl, ParamDecl, TypeDesc};

pub mod c;
pub mod java;

pub use c::CMarshaller;
pub use java::JavaMarshaller;

/// Per-parameter marshaling state. Lives only while its method is emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarshalContext {
    /// Name of the value at the call site (the parameter name, or the
    /// result variable for returns).
    pub arg_name: String,
    /// Position among the non-implicit parameters.
    pub index: usize,
    pub direction: Direction,
    /// Spelling of the value's type at the native boundary.
    pub native_type: String,
    pub before: Vec<String>,
    /// Expression handed to the call (for returns: the returned expression).
    pub arg: String,
    pub after: Vec<String>,
}

impl MarshalContext {
    pub fn for_param(param: &ParamDecl, index: usize) -> Self {
        Self {
            arg_name: param.name.clone(),
            index,
            direction: param.direction,
            ..Self::default()
        }
    }

    pub fn for_return(result_name: &str) -> Self {
        Self {
            arg_name: result_name.to_string(),
            ..Self::default()
        }
    }

    pub fn before(&mut self, line: impl Into<String>) {
        self.before.push(line.into());
    }

    pub fn after(&mut self, line: impl Into<String>) {
        self.after.push(line.into());
    }
}

/// Produces call-site fragments for one target.
pub trait Marshaller {
    /// Fill `cx` for a parameter of type `ty`. Leaving `cx.arg` empty marks
    /// a type this marshaller cannot convert.
    fn marshal_param(&self, cx: &mut MarshalContext, ty: &TypeDesc) -> Result<()>;

    /// Fill `cx` for a returned value of type `ty`. `cx.arg` becomes the
    /// expression to return; `cx.before` runs after the exception check.
    fn marshal_return(&self, cx: &mut MarshalContext, ty: &TypeDesc) -> Result<()>;

    /// Name of the variable holding the raw call result.
    fn result_name(&self) -> &'static str;
}

/// Everything an emitter needs to assemble one method body.
#[derive(Debug, Default)]
pub struct CallPlan {
    /// The receiver's handle is passed ahead of the parameters.
    pub receiver: bool,
    pub params: Vec<MarshalContext>,
    pub ret: Option<MarshalContext>,
}

impl CallPlan {
    pub fn before(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .flat_map(|p| p.before.iter().map(String::as_str))
    }

    pub fn args(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.arg.as_str())
    }

    pub fn after(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .flat_map(|p| p.after.iter().map(String::as_str))
    }
}

/// Marshal every visible parameter left to right, then the return value of
/// non-void normal methods.
pub fn plan_call<M: Marshaller + ?Sized>(
    marshaller: &M,
    method: &MethodDecl,
    method_name: &str,
) -> Result<CallPlan> {
    let mut plan = CallPlan {
        receiver: method.takes_receiver(),
        ..CallPlan::default()
    };

    for (index, param) in method.visible_params().enumerate() {
        let mut cx = MarshalContext::for_param(param, index);
        marshaller.marshal_param(&mut cx, &param.ty)?;
        if cx.arg.is_empty() {
            return Err(GenError::EmptyMarshal {
                method: method_name.to_string(),
            });
        }
        plan.params.push(cx);
    }

    if method.has_return() {
        let mut cx = MarshalContext::for_return(marshaller.result_name());
        marshaller.marshal_return(&mut cx, &method.return_type)?;
        if cx.arg.is_empty() {
            return Err(GenError::EmptyMarshal {
                method: method_name.to_string(),
            });
        }
        plan.ret = Some(cx);
    }
    Ok(plan)
}
