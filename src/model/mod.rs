mod change;
mod severity;
mod surface;

pub use change::{ChangeKind, ChangePath, ChangeRecord};
pub use severity::{Bump, Severity, Verdict};
pub use surface::{
    AttributeSurface, ClassSurface, DefaultValue, FunctionSurface, ModuleSurface, ParamKind,
    Parameter, Surface, TypeRef,
};
