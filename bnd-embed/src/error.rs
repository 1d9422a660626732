//! Generation error types.

use crate::model::DeclKind;
use crate::printer::PrintContext;
use crate::Target;

/// Fatal conditions that abort generation of a translation unit.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// A type has no spelling in the requested context.
    #[error("unsupported type `{ty}` for the {target} target in {context} context")]
    UnsupportedType {
        ty: String,
        target: Target,
        context: PrintContext,
    },

    /// A declaration variant reached a visitor with no behavior for it.
    #[error("unhandled {kind} declaration `{name}` for the {target} target")]
    UnhandledDecl {
        kind: DeclKind,
        name: String,
        target: Target,
    },

    /// Parameter or return marshaling produced no expression.
    #[error("marshaling `{method}` produced an empty expression")]
    EmptyMarshal { method: String },

    /// A named type reference that no loaded unit declares.
    #[error("unknown type `{name}`")]
    UnknownType { name: String },

    /// Enum backing type is not a fixed-width integer.
    #[error("enum `{name}` has non-integral backing type {underlying}")]
    InvalidEnumBacking { name: String, underlying: String },

    /// An enum item value does not fit the backing type.
    #[error("enum `{name}` item `{item}` = {value} does not fit {underlying}")]
    EnumValueOutOfRange {
        name: String,
        item: String,
        value: i64,
        underlying: String,
    },

    /// Two C type names spell the same within one unit.
    #[error("C type name `{name}` is declared by both `{first}` and `{second}`")]
    TypeNameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// Two ABI symbols spell the same after overload disambiguation.
    #[error("ABI symbol `{symbol}` is emitted more than once")]
    SymbolCollision { symbol: String },

    /// Two declarations derive the same output path.
    #[error("output path `{path}` is derived by more than one declaration")]
    PathCollision { path: String },
}

/// Result type alias for generation.
pub type Result<T> = std::result::Result<T, GenError>;
