use syn::{GenericArgument, PathArguments, Type};

// wrappers an embedded or referenced member may sit behind
const OBJECT_WRAPPERS: [&str; 2] = ["Option", "Box"];

/// The mapped type behind `Option<..>` / `Box<..>` layers.
pub(crate) fn object_type(ty: &Type) -> &Type {
    let mut current = ty;

    while let Some(inner) = single_wrapped(current) {
        current = inner;
    }

    current
}

fn single_wrapped(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if !OBJECT_WRAPPERS.iter().any(|wrapper| segment.ident == wrapper) {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}
