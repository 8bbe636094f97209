//! Best-effort expression typing over lowered Rust trees.
//!
//! Only expressions whose type follows from their own syntax are resolved. Anything that
//! needs name lookup or inference is reported as an error and left to the caller.

use crate::domain::node::{AstNode, NodeView};
use crate::ports::{ResolveError, TypeResolver};

#[derive(Debug, Default, Clone, Copy)]
pub struct SynTypeResolver;

const COMPARISON_OPS: [&str; 8] = ["==", "!=", "<", "<=", ">", ">=", "&&", "||"];

impl SynTypeResolver {
    fn literal(node: &AstNode) -> Result<String, ResolveError> {
        let value = node.attribute("value").unwrap_or_default();
        let ty = match node.attribute("kind").unwrap_or_default() {
            "str" => "&str".to_string(),
            "byte_str" => "&[u8]".to_string(),
            "c_str" => "&CStr".to_string(),
            "byte" => "u8".to_string(),
            "char" => "char".to_string(),
            "bool" => "bool".to_string(),
            "int" => numeric_suffix(value, INT_SUFFIXES).unwrap_or("i32").to_string(),
            "float" => numeric_suffix(value, FLOAT_SUFFIXES).unwrap_or("f64").to_string(),
            _ => return Err(ResolveError::Unsupported(format!("literal {}", value))),
        };
        Ok(ty)
    }

    fn child<'n>(node: &'n AstNode, slot: &str) -> Result<&'n AstNode, ResolveError> {
        node.child(slot)
            .ok_or_else(|| ResolveError::Unsupported(format!("{} without {}", node.type_name, slot)))
    }

    fn elements(&self, node: &AstNode) -> Result<Vec<String>, ResolveError> {
        node.list("elements").iter().map(|e| self.resolve(e)).collect()
    }
}

const INT_SUFFIXES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
];
const FLOAT_SUFFIXES: &[&str] = &["f32", "f64"];

fn numeric_suffix(literal: &str, suffixes: &[&'static str]) -> Option<&'static str> {
    suffixes.iter().copied().find(|s| literal.ends_with(s))
}

/// Render a lowered type node back to compact Rust syntax.
pub fn render_type(node: &AstNode) -> Result<String, ResolveError> {
    match node.type_name.as_str() {
        "TypePath" => {
            let segments = node
                .list("segments")
                .iter()
                .map(|seg| -> Result<String, ResolveError> {
                    let name = seg
                        .child("name")
                        .and_then(|n| n.attribute("identifier"))
                        .unwrap_or_default()
                        .to_string();
                    let args = seg.list("arguments");
                    if args.is_empty() {
                        return Ok(name);
                    }
                    let rendered: Vec<String> =
                        args.iter().map(render_type).collect::<Result<_, _>>()?;
                    Ok(format!("{}<{}>", name, rendered.join(", ")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(segments.join("::"))
        }
        "TypeReference" => {
            let elem = render_type(SynTypeResolver::child(node, "elem")?)?;
            let mutable = node.attribute("mutable") == Some("true");
            Ok(format!("&{}{}", if mutable { "mut " } else { "" }, elem))
        }
        "TypeSlice" => Ok(format!("[{}]", render_type(SynTypeResolver::child(node, "elem")?)?)),
        "TypeParen" => render_type(SynTypeResolver::child(node, "elem")?),
        "TypeTuple" => {
            let elems: Vec<String> = node
                .list("elements")
                .iter()
                .map(render_type)
                .collect::<Result<_, _>>()?;
            Ok(tuple(&elems))
        }
        _ => node
            .attribute("tokens")
            .map(str::to_string)
            .ok_or_else(|| ResolveError::Unsupported(node.type_name.clone())),
    }
}

fn tuple(elems: &[String]) -> String {
    match elems {
        [single] => format!("({},)", single),
        _ => format!("({})", elems.join(", ")),
    }
}

impl TypeResolver<AstNode> for SynTypeResolver {
    fn resolve(&self, node: &AstNode) -> Result<String, ResolveError> {
        match node.type_name() {
            "ExprLit" => Self::literal(node),
            "ExprCast" => render_type(Self::child(node, "ty")?),
            "ExprParen" => self.resolve(Self::child(node, "expr")?),
            "ExprReference" => {
                let inner = self.resolve(Self::child(node, "expr")?)?;
                let mutable = node.attribute("mutable") == Some("true");
                Ok(format!("&{}{}", if mutable { "mut " } else { "" }, inner))
            }
            "ExprTuple" => Ok(tuple(&self.elements(node)?)),
            "ExprArray" => {
                let elems = self.elements(node)?;
                match elems.first() {
                    Some(first) if elems.iter().all(|e| e == first) => {
                        Ok(format!("[{}; {}]", first, elems.len()))
                    }
                    Some(_) => Err(ResolveError::Unsupported("mixed array".to_string())),
                    None => Err(ResolveError::Unsupported("empty array".to_string())),
                }
            }
            "ExprBinary" => {
                let op = node.attribute("operator").unwrap_or_default();
                if COMPARISON_OPS.contains(&op) {
                    return Ok("bool".to_string());
                }
                let left = self.resolve(Self::child(node, "left")?)?;
                let right = self.resolve(Self::child(node, "right")?)?;
                if left == right {
                    Ok(left)
                } else {
                    Err(ResolveError::Unsupported(format!("{} {} {}", left, op, right)))
                }
            }
            "ExprUnary" if node.attribute("operator") != Some("*") => {
                self.resolve(Self::child(node, "expr")?)
            }
            "ExprStruct" => node
                .attribute("path")
                .map(|p| p.replace(' ', ""))
                .ok_or_else(|| ResolveError::Unsupported("struct literal".to_string())),
            "ExprPath" => Err(ResolveError::UnsolvedSymbol(
                node.attribute("path").unwrap_or_default().to_string(),
            )),
            other => Err(ResolveError::Unsupported(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(kind: &str, value: &str) -> AstNode {
        AstNode::builder("ExprLit")
            .attr("kind", kind)
            .attr("value", value)
            .expression()
            .build()
    }

    fn path_type(name: &str) -> AstNode {
        AstNode::builder("TypePath")
            .list(
                "segments",
                vec![AstNode::builder("PathSegment")
                    .child(
                        "name",
                        Some(AstNode::builder("Ident").attr("identifier", name).build()),
                    )
                    .build()],
            )
            .build()
    }

    #[test]
    fn test_literals() {
        let resolver = SynTypeResolver;
        assert_eq!(resolver.resolve(&lit("str", "hi")).unwrap(), "&str");
        assert_eq!(resolver.resolve(&lit("int", "42")).unwrap(), "i32");
        assert_eq!(resolver.resolve(&lit("int", "42u8")).unwrap(), "u8");
        assert_eq!(resolver.resolve(&lit("float", "1.5f32")).unwrap(), "f32");
        assert_eq!(resolver.resolve(&lit("float", "1.5")).unwrap(), "f64");
        assert_eq!(resolver.resolve(&lit("bool", "true")).unwrap(), "bool");
    }

    #[test]
    fn test_composites() {
        let resolver = SynTypeResolver;
        let tuple = AstNode::builder("ExprTuple")
            .list("elements", vec![lit("int", "1"), lit("char", "c")])
            .build();
        assert_eq!(resolver.resolve(&tuple).unwrap(), "(i32, char)");

        let array = AstNode::builder("ExprArray")
            .list("elements", vec![lit("int", "1"), lit("int", "2")])
            .build();
        assert_eq!(resolver.resolve(&array).unwrap(), "[i32; 2]");

        let reference = AstNode::builder("ExprReference")
            .attr("mutable", "true")
            .child("expr", Some(array))
            .build();
        assert_eq!(resolver.resolve(&reference).unwrap(), "&mut [i32; 2]");

        let cast = AstNode::builder("ExprCast")
            .child("expr", Some(lit("int", "1")))
            .child("ty", Some(path_type("u64")))
            .build();
        assert_eq!(resolver.resolve(&cast).unwrap(), "u64");

        let comparison = AstNode::builder("ExprBinary")
            .attr("operator", "<")
            .child("left", Some(AstNode::builder("ExprPath").attr("path", "a").build()))
            .child("right", Some(lit("int", "1")))
            .build();
        assert_eq!(resolver.resolve(&comparison).unwrap(), "bool");
    }

    #[test]
    fn test_failures() {
        let resolver = SynTypeResolver;
        let path = AstNode::builder("ExprPath").attr("path", "x").build();
        assert_eq!(
            resolver.resolve(&path),
            Err(ResolveError::UnsolvedSymbol("x".to_string()))
        );
        let call = AstNode::builder("ExprCall").build();
        assert!(matches!(resolver.resolve(&call), Err(ResolveError::Unsupported(_))));
        let empty = AstNode::builder("ExprArray").build();
        assert!(resolver.resolve(&empty).is_err());
    }
}
