use crate::parser::Type;

/// Maps a Cadenza type reference to its C# spelling (spec §4.4). Primitive
/// names stay lower-case everywhere, including XML docs — not the
/// PascalCase framework aliases.
pub fn emit_type(ty: &Type) -> String {
    match ty {
        Type::Int => "int".to_string(),
        Type::String => "string".to_string(),
        Type::Bool => "bool".to_string(),
        Type::Result(ok, err) => format!("Result<{}, {}>", emit_type(ok), emit_type(err)),
        Type::Option(inner) => format!("Option<{}>", emit_type(inner)),
        Type::List(inner) => format!("List<{}>", emit_type(inner)),
        Type::Named(name) => name.clone(),
    }
}
