use serde::Serialize;

/// IR value types. Equality is structural: `i32*` equals `i32*` however each was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Type {
    Integer(u32),
    Pointer(Box<Type>),
}

impl Type {
    pub fn i1() -> Self {
        Type::Integer(1)
    }

    pub fn i32() -> Self {
        Type::Integer(32)
    }

    pub fn pointer_to(target: Type) -> Self {
        Type::Pointer(Box::new(target))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    /// Resolves a primitive type name as written in the source
    pub fn from_primitive_name(name: &str) -> Option<Self> {
        let width = name.strip_prefix('i')?;
        match width {
            "1" | "8" | "16" | "32" | "64" => width.parse().ok().map(Type::Integer),
            _ => None,
        }
    }
}
