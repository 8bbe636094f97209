//! Lowering of `syn` syntax trees into [`AstNode`]s.
//!
//! Each syntax kind becomes a node named after its `syn` type. Single children go into
//! named slots and repeated children into plural list slots, both in source order.
//! Kinds without a dedicated lowering keep their token text in a `tokens` attribute.

use crate::domain::node::{AstNode, AstNodeBuilder, SourceRange, SourceSlice};
use proc_macro2::{LineColumn, Span};
use quote::ToTokens;
use std::sync::Arc;
use syn::spanned::Spanned;
use syn::{
    Attribute, Block, Expr, Fields, FnArg, GenericArgument, GenericParam, Generics, ImplItem,
    Item, Lit, Pat, PathArguments, ReturnType, Signature, Stmt, TraitItem, Type, Visibility,
};

/// Byte offsets of line starts, used to map span positions back into the source.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// Byte offset of a 1-based line and 0-based char column.
    pub fn offset(&self, source: &str, at: LineColumn) -> Option<usize> {
        let start = *self.line_starts.get(at.line.checked_sub(1)?)?;
        source
            .get(start..)?
            .char_indices()
            .map(|(i, _)| start + i)
            .chain(std::iter::once(source.len()))
            .nth(at.column)
    }
}

fn tokens<T: ToTokens + ?Sized>(value: &T) -> String {
    value.to_token_stream().to_string()
}

fn visibility(vis: &Visibility) -> Option<String> {
    match vis {
        Visibility::Inherited => None,
        other => Some(tokens(other)),
    }
}

fn modifiers(sig: &Signature) -> Option<String> {
    let mut words = Vec::new();
    if sig.constness.is_some() {
        words.push("const".to_string());
    }
    if sig.asyncness.is_some() {
        words.push("async".to_string());
    }
    if sig.unsafety.is_some() {
        words.push("unsafe".to_string());
    }
    if let Some(abi) = &sig.abi {
        words.push(tokens(abi));
    }
    (!words.is_empty()).then(|| words.join(" "))
}

fn doc_line(attr: &Attribute) -> Option<String> {
    match &attr.meta {
        syn::Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(syn::ExprLit {
                lit: Lit::Str(s), ..
            }) => {
                let value = s.value();
                Some(value.strip_prefix(' ').unwrap_or(&value).to_string())
            }
            _ => None,
        },
        _ => None,
    }
}

fn lit_kind(lit: &Lit) -> &'static str {
    match lit {
        Lit::Str(_) => "str",
        Lit::ByteStr(_) => "byte_str",
        Lit::CStr(_) => "c_str",
        Lit::Byte(_) => "byte",
        Lit::Char(_) => "char",
        Lit::Int(_) => "int",
        Lit::Float(_) => "float",
        Lit::Bool(_) => "bool",
        _ => "verbatim",
    }
}

fn lit_value(lit: &Lit) -> String {
    match lit {
        Lit::Str(s) => s.value(),
        Lit::Char(c) => c.value().to_string(),
        Lit::Bool(b) => b.value.to_string(),
        other => tokens(other),
    }
}

fn bool_attr(flag: bool) -> String {
    flag.to_string()
}

/// Converts one parsed file. Holds the source so every node can expose its text.
pub struct Lowering {
    source: Arc<str>,
    index: LineIndex,
}

impl Lowering {
    pub fn new(source: Arc<str>) -> Self {
        let index = LineIndex::new(&source);
        Self { source, index }
    }

    /// Range and text slice of a span. Empty spans have neither.
    fn locate(&self, span: Span) -> (Option<SourceRange>, Option<SourceSlice>) {
        let (start, end) = (span.start(), span.end());
        if start == end {
            return (None, None);
        }
        let range = SourceRange::new(start.line, start.column + 1, end.line, end.column);
        let text = match (
            self.index.offset(&self.source, start),
            self.index.offset(&self.source, end),
        ) {
            (Some(from), Some(to)) if from <= to => Some(SourceSlice {
                source: self.source.clone(),
                span: from..to,
            }),
            _ => None,
        };
        (Some(range), text)
    }

    fn start(&self, type_name: &str, span: Span) -> AstNodeBuilder {
        let (range, text) = self.locate(span);
        AstNode::builder(type_name).range(range).text(text)
    }

    fn verbatim<T: ToTokens>(&self, type_name: &str, value: &T) -> AstNode {
        self.start(type_name, value.span())
            .attr("tokens", tokens(value))
            .build()
    }

    fn ident(&self, ident: &syn::Ident) -> AstNode {
        self.start("Ident", ident.span())
            .attr("identifier", ident.to_string())
            .build()
    }

    /// Doc comments go into the `comment` slot, every other attribute into `attributes`.
    fn attrs(&self, builder: AstNodeBuilder, attrs: &[Attribute]) -> AstNodeBuilder {
        let docs: Vec<&Attribute> = attrs.iter().filter(|a| a.path().is_ident("doc")).collect();
        let comment = match (docs.first(), docs.last()) {
            (Some(first), Some(last)) => {
                let span = first.span().join(last.span()).unwrap_or_else(|| first.span());
                let content: Vec<String> = docs.iter().filter_map(|a| doc_line(a)).collect();
                Some(
                    self.start("DocComment", span)
                        .attr("content", content.join("\n"))
                        .build(),
                )
            }
            _ => None,
        };

        let others = attrs
            .iter()
            .filter(|a| !a.path().is_ident("doc"))
            .map(|a| self.attribute(a))
            .collect();

        builder.child("comment", comment).list("attributes", others)
    }

    fn attribute(&self, attr: &Attribute) -> AstNode {
        let style = match attr.style {
            syn::AttrStyle::Outer => "outer",
            syn::AttrStyle::Inner(_) => "inner",
        };
        self.start("Attribute", attr.span())
            .attr("style", style)
            .attr("path", tokens(attr.path()))
            .attr("tokens", tokens(&attr.meta))
            .build()
    }

    pub fn file(&self, file: &syn::File) -> AstNode {
        let builder = self.start("File", file.span());
        self.attrs(builder, &file.attrs)
            .attr_opt("shebang", file.shebang.clone())
            .list("items", file.items.iter().map(|i| self.item(i)).collect())
            .build()
    }

    fn generics(&self, generics: &Generics) -> Vec<AstNode> {
        generics
            .params
            .iter()
            .map(|param| match param {
                GenericParam::Type(t) => {
                    let bounds = (!t.bounds.is_empty()).then(|| tokens(&t.bounds));
                    self.start("TypeParam", t.span())
                        .attr_opt("bounds", bounds)
                        .child("name", Some(self.ident(&t.ident)))
                        .child("default", t.default.as_ref().map(|d| self.ty(d)))
                        .build()
                }
                GenericParam::Lifetime(l) => self
                    .start("LifetimeParam", l.span())
                    .attr("lifetime", tokens(&l.lifetime))
                    .build(),
                GenericParam::Const(c) => self
                    .start("ConstParam", c.span())
                    .child("name", Some(self.ident(&c.ident)))
                    .child("ty", Some(self.ty(&c.ty)))
                    .child("default", c.default.as_ref().map(|d| self.expr(d)))
                    .build(),
            })
            .collect()
    }

    fn function(
        &self,
        type_name: &str,
        span: Span,
        attrs: &[Attribute],
        vis: Option<&Visibility>,
        sig: &Signature,
        body: Option<&Block>,
    ) -> AstNode {
        let return_type = match &sig.output {
            ReturnType::Default => None,
            ReturnType::Type(_, ty) => Some(self.ty(ty)),
        };
        self.attrs(self.start(type_name, span), attrs)
            .attr_opt("visibility", vis.and_then(visibility))
            .attr_opt("modifiers", modifiers(sig))
            .child("name", Some(self.ident(&sig.ident)))
            .child("return_type", return_type)
            .child("body", body.map(|b| self.block(b)))
            .list("generic_params", self.generics(&sig.generics))
            .list(
                "parameters",
                sig.inputs.iter().map(|arg| self.fn_arg(arg)).collect(),
            )
            .build()
    }

    fn fn_arg(&self, arg: &FnArg) -> AstNode {
        match arg {
            FnArg::Receiver(r) => self
                .start("Receiver", r.span())
                .attr("reference", bool_attr(r.reference.is_some()))
                .attr("mutable", bool_attr(r.mutability.is_some()))
                .build(),
            FnArg::Typed(pt) => self.pat_type(pt),
        }
    }

    fn fields(&self, fields: &Fields) -> Vec<AstNode> {
        fields
            .iter()
            .map(|f| {
                self.attrs(self.start("Field", f.span()), &f.attrs)
                    .attr_opt("visibility", visibility(&f.vis))
                    .child("name", f.ident.as_ref().map(|i| self.ident(i)))
                    .child("ty", Some(self.ty(&f.ty)))
                    .build()
            })
            .collect()
    }

    fn fields_style(fields: &Fields) -> &'static str {
        match fields {
            Fields::Named(_) => "named",
            Fields::Unnamed(_) => "tuple",
            Fields::Unit => "unit",
        }
    }

    pub fn item(&self, item: &Item) -> AstNode {
        match item {
            Item::Fn(f) => self.function(
                "ItemFn",
                f.span(),
                &f.attrs,
                Some(&f.vis),
                &f.sig,
                Some(&f.block),
            ),
            Item::Struct(s) => self
                .attrs(self.start("ItemStruct", s.span()), &s.attrs)
                .attr_opt("visibility", visibility(&s.vis))
                .attr("style", Self::fields_style(&s.fields))
                .child("name", Some(self.ident(&s.ident)))
                .list("generic_params", self.generics(&s.generics))
                .list("fields", self.fields(&s.fields))
                .build(),
            Item::Enum(e) => {
                let variants = e
                    .variants
                    .iter()
                    .map(|v| {
                        self.attrs(self.start("Variant", v.span()), &v.attrs)
                            .attr("style", Self::fields_style(&v.fields))
                            .child("name", Some(self.ident(&v.ident)))
                            .child(
                                "discriminant",
                                v.discriminant.as_ref().map(|(_, d)| self.expr(d)),
                            )
                            .list("fields", self.fields(&v.fields))
                            .build()
                    })
                    .collect();
                self.attrs(self.start("ItemEnum", e.span()), &e.attrs)
                    .attr_opt("visibility", visibility(&e.vis))
                    .child("name", Some(self.ident(&e.ident)))
                    .list("generic_params", self.generics(&e.generics))
                    .list("variants", variants)
                    .build()
            }
            Item::Use(u) => self
                .attrs(self.start("ItemUse", u.span()), &u.attrs)
                .attr_opt("visibility", visibility(&u.vis))
                .child("tree", Some(self.verbatim("UseTree", &u.tree)))
                .build(),
            Item::Const(c) => self
                .attrs(self.start("ItemConst", c.span()), &c.attrs)
                .attr_opt("visibility", visibility(&c.vis))
                .child("name", Some(self.ident(&c.ident)))
                .child("ty", Some(self.ty(&c.ty)))
                .child("value", Some(self.expr(&c.expr)))
                .build(),
            Item::Static(s) => self
                .attrs(self.start("ItemStatic", s.span()), &s.attrs)
                .attr_opt("visibility", visibility(&s.vis))
                .attr(
                    "mutable",
                    bool_attr(matches!(s.mutability, syn::StaticMutability::Mut(_))),
                )
                .child("name", Some(self.ident(&s.ident)))
                .child("ty", Some(self.ty(&s.ty)))
                .child("value", Some(self.expr(&s.expr)))
                .build(),
            Item::Mod(m) => {
                let items = m
                    .content
                    .as_ref()
                    .map(|(_, items)| items.iter().map(|i| self.item(i)).collect())
                    .unwrap_or_default();
                self.attrs(self.start("ItemMod", m.span()), &m.attrs)
                    .attr_opt("visibility", visibility(&m.vis))
                    .attr("inline", bool_attr(m.content.is_some()))
                    .child("name", Some(self.ident(&m.ident)))
                    .list("items", items)
                    .build()
            }
            Item::Impl(i) => {
                let trait_name = i.trait_.as_ref().map(|(bang, path, _)| {
                    format!("{}{}", if bang.is_some() { "!" } else { "" }, tokens(path))
                });
                self.attrs(self.start("ItemImpl", i.span()), &i.attrs)
                    .attr_opt("trait", trait_name)
                    .attr("unsafe", bool_attr(i.unsafety.is_some()))
                    .child("self_ty", Some(self.ty(&i.self_ty)))
                    .list("generic_params", self.generics(&i.generics))
                    .list("items", i.items.iter().map(|it| self.impl_item(it)).collect())
                    .build()
            }
            Item::Trait(t) => {
                let supertraits = (!t.supertraits.is_empty()).then(|| tokens(&t.supertraits));
                self.attrs(self.start("ItemTrait", t.span()), &t.attrs)
                    .attr_opt("visibility", visibility(&t.vis))
                    .attr_opt("supertraits", supertraits)
                    .child("name", Some(self.ident(&t.ident)))
                    .list("generic_params", self.generics(&t.generics))
                    .list("items", t.items.iter().map(|it| self.trait_item(it)).collect())
                    .build()
            }
            Item::Type(t) => self
                .attrs(self.start("ItemType", t.span()), &t.attrs)
                .attr_opt("visibility", visibility(&t.vis))
                .child("name", Some(self.ident(&t.ident)))
                .child("ty", Some(self.ty(&t.ty)))
                .list("generic_params", self.generics(&t.generics))
                .build(),
            Item::Macro(m) => self
                .attrs(self.start("ItemMacro", m.span()), &m.attrs)
                .attr("path", tokens(&m.mac.path))
                .attr("tokens", tokens(&m.mac.tokens))
                .child("name", m.ident.as_ref().map(|i| self.ident(i)))
                .build(),
            other => self.verbatim("Item", other),
        }
    }

    fn impl_item(&self, item: &ImplItem) -> AstNode {
        match item {
            ImplItem::Fn(f) => self.function(
                "ImplItemFn",
                f.span(),
                &f.attrs,
                Some(&f.vis),
                &f.sig,
                Some(&f.block),
            ),
            ImplItem::Const(c) => self
                .attrs(self.start("ImplItemConst", c.span()), &c.attrs)
                .attr_opt("visibility", visibility(&c.vis))
                .child("name", Some(self.ident(&c.ident)))
                .child("ty", Some(self.ty(&c.ty)))
                .child("value", Some(self.expr(&c.expr)))
                .build(),
            ImplItem::Type(t) => self
                .attrs(self.start("ImplItemType", t.span()), &t.attrs)
                .attr_opt("visibility", visibility(&t.vis))
                .child("name", Some(self.ident(&t.ident)))
                .child("ty", Some(self.ty(&t.ty)))
                .build(),
            other => self.verbatim("ImplItem", other),
        }
    }

    fn trait_item(&self, item: &TraitItem) -> AstNode {
        match item {
            TraitItem::Fn(f) => self.function(
                "TraitItemFn",
                f.span(),
                &f.attrs,
                None,
                &f.sig,
                f.default.as_ref(),
            ),
            TraitItem::Const(c) => self
                .attrs(self.start("TraitItemConst", c.span()), &c.attrs)
                .child("name", Some(self.ident(&c.ident)))
                .child("ty", Some(self.ty(&c.ty)))
                .child("value", c.default.as_ref().map(|(_, e)| self.expr(e)))
                .build(),
            TraitItem::Type(t) => {
                let bounds = (!t.bounds.is_empty()).then(|| tokens(&t.bounds));
                self.attrs(self.start("TraitItemType", t.span()), &t.attrs)
                    .attr_opt("bounds", bounds)
                    .child("name", Some(self.ident(&t.ident)))
                    .child("default", t.default.as_ref().map(|(_, ty)| self.ty(ty)))
                    .build()
            }
            other => self.verbatim("TraitItem", other),
        }
    }

    fn block(&self, block: &Block) -> AstNode {
        self.start("Block", block.span())
            .list(
                "statements",
                block.stmts.iter().map(|s| self.stmt(s)).collect(),
            )
            .build()
    }

    fn stmt(&self, stmt: &Stmt) -> AstNode {
        match stmt {
            Stmt::Local(local) => {
                let init = local.init.as_ref();
                self.attrs(self.start("Local", local.span()), &local.attrs)
                    .child("pat", Some(self.pat(&local.pat)))
                    .child("init", init.map(|i| self.expr(&i.expr)))
                    .child(
                        "diverge",
                        init.and_then(|i| i.diverge.as_ref()).map(|(_, e)| self.expr(e)),
                    )
                    .build()
            }
            Stmt::Item(item) => self.item(item),
            Stmt::Expr(expr, Some(_)) => self
                .start("StmtExpr", stmt.span())
                .child("expr", Some(self.expr(expr)))
                .build(),
            Stmt::Expr(expr, None) => self.expr(expr),
            Stmt::Macro(m) => self
                .attrs(self.start("StmtMacro", m.span()), &m.attrs)
                .attr("path", tokens(&m.mac.path))
                .attr("tokens", tokens(&m.mac.tokens))
                .build(),
        }
    }

    fn pat_type(&self, pt: &syn::PatType) -> AstNode {
        self.start("PatType", pt.span())
            .child("pat", Some(self.pat(&pt.pat)))
            .child("ty", Some(self.ty(&pt.ty)))
            .build()
    }

    fn pats<'p>(&self, pats: impl Iterator<Item = &'p Pat>) -> Vec<AstNode> {
        pats.map(|p| self.pat(p)).collect()
    }

    pub fn pat(&self, pat: &Pat) -> AstNode {
        match pat {
            Pat::Ident(p) => self
                .start("PatIdent", p.span())
                .attr("by_ref", bool_attr(p.by_ref.is_some()))
                .attr("mutable", bool_attr(p.mutability.is_some()))
                .child("name", Some(self.ident(&p.ident)))
                .child("subpat", p.subpat.as_ref().map(|(_, sub)| self.pat(sub)))
                .build(),
            Pat::Type(pt) => self.pat_type(pt),
            Pat::Tuple(t) => self
                .start("PatTuple", t.span())
                .list("elements", self.pats(t.elems.iter()))
                .build(),
            Pat::TupleStruct(t) => self
                .start("PatTupleStruct", t.span())
                .attr("path", tokens(&t.path))
                .list("elements", self.pats(t.elems.iter()))
                .build(),
            Pat::Struct(s) => {
                let fields = s
                    .fields
                    .iter()
                    .map(|f| {
                        self.start("FieldPat", f.span())
                            .attr("member", tokens(&f.member))
                            .child("pat", Some(self.pat(&f.pat)))
                            .build()
                    })
                    .collect();
                self.start("PatStruct", s.span())
                    .attr("path", tokens(&s.path))
                    .attr("rest", bool_attr(s.rest.is_some()))
                    .list("fields", fields)
                    .build()
            }
            Pat::Reference(r) => self
                .start("PatReference", r.span())
                .attr("mutable", bool_attr(r.mutability.is_some()))
                .child("pat", Some(self.pat(&r.pat)))
                .build(),
            Pat::Wild(w) => self.start("PatWild", w.span()).build(),
            Pat::Lit(l) => self.lit(l),
            Pat::Path(p) => self
                .start("PatPath", p.span())
                .attr("path", tokens(&p.path))
                .build(),
            Pat::Or(o) => self
                .start("PatOr", o.span())
                .list("cases", self.pats(o.cases.iter()))
                .build(),
            Pat::Slice(s) => self
                .start("PatSlice", s.span())
                .list("elements", self.pats(s.elems.iter()))
                .build(),
            Pat::Range(r) => self.verbatim("PatRange", r),
            Pat::Rest(r) => self.start("PatRest", r.span()).build(),
            other => self.verbatim("Pat", other),
        }
    }

    fn path_segments(&self, path: &syn::Path) -> Vec<AstNode> {
        path.segments
            .iter()
            .map(|seg| {
                let arguments = match &seg.arguments {
                    PathArguments::AngleBracketed(args) => args
                        .args
                        .iter()
                        .map(|arg| match arg {
                            GenericArgument::Type(ty) => self.ty(ty),
                            GenericArgument::Lifetime(l) => self.verbatim("Lifetime", l),
                            other => self.verbatim("GenericArgument", other),
                        })
                        .collect(),
                    PathArguments::Parenthesized(args) => {
                        vec![self.verbatim("ParenthesizedGenericArguments", args)]
                    }
                    PathArguments::None => Vec::new(),
                };
                self.start("PathSegment", seg.span())
                    .child("name", Some(self.ident(&seg.ident)))
                    .list("arguments", arguments)
                    .build()
            })
            .collect()
    }

    pub fn ty(&self, ty: &Type) -> AstNode {
        match ty {
            Type::Path(p) if p.qself.is_none() => self
                .start("TypePath", p.span())
                .attr("path", tokens(&p.path))
                .list("segments", self.path_segments(&p.path))
                .build(),
            Type::Reference(r) => self
                .start("TypeReference", r.span())
                .attr_opt("lifetime", r.lifetime.as_ref().map(tokens))
                .attr("mutable", bool_attr(r.mutability.is_some()))
                .child("elem", Some(self.ty(&r.elem)))
                .build(),
            Type::Tuple(t) => self
                .start("TypeTuple", t.span())
                .list("elements", t.elems.iter().map(|e| self.ty(e)).collect())
                .build(),
            Type::Array(a) => self
                .start("TypeArray", a.span())
                .child("elem", Some(self.ty(&a.elem)))
                .child("len", Some(self.expr(&a.len)))
                .build(),
            Type::Slice(s) => self
                .start("TypeSlice", s.span())
                .child("elem", Some(self.ty(&s.elem)))
                .build(),
            Type::Ptr(p) => self
                .start("TypePtr", p.span())
                .attr("mutable", bool_attr(p.mutability.is_some()))
                .child("elem", Some(self.ty(&p.elem)))
                .build(),
            Type::Paren(p) => self
                .start("TypeParen", p.span())
                .child("elem", Some(self.ty(&p.elem)))
                .build(),
            Type::Group(g) => self.ty(&g.elem),
            Type::Never(n) => self.verbatim("TypeNever", n),
            Type::ImplTrait(t) => self.verbatim("TypeImplTrait", t),
            Type::TraitObject(t) => self.verbatim("TypeTraitObject", t),
            Type::BareFn(f) => self.verbatim("TypeBareFn", f),
            Type::Infer(i) => self.verbatim("TypeInfer", i),
            Type::Macro(m) => self.verbatim("TypeMacro", m),
            other => self.verbatim("Type", other),
        }
    }

    fn lit(&self, lit: &syn::ExprLit) -> AstNode {
        let mut builder = self
            .start("ExprLit", lit.span())
            .attr("kind", lit_kind(&lit.lit))
            .attr("value", lit_value(&lit.lit))
            .expression();
        if matches!(lit.lit, Lit::Str(_)) {
            builder = builder.string_literal();
        }
        builder.build()
    }

    fn exprs<'e>(&self, exprs: impl Iterator<Item = &'e Expr>) -> Vec<AstNode> {
        exprs.map(|e| self.expr(e)).collect()
    }

    fn label(label: Option<&syn::Label>) -> Option<String> {
        label.map(|l| tokens(&l.name))
    }

    pub fn expr(&self, expr: &Expr) -> AstNode {
        let node = |type_name: &str, span: Span| self.start(type_name, span).expression();

        match expr {
            Expr::Lit(l) => self.lit(l),
            Expr::Path(p) => node("ExprPath", p.span())
                .attr("path", tokens(&p.path))
                .build(),
            Expr::Binary(b) => node("ExprBinary", b.span())
                .attr("operator", tokens(&b.op))
                .child("left", Some(self.expr(&b.left)))
                .child("right", Some(self.expr(&b.right)))
                .build(),
            Expr::Unary(u) => node("ExprUnary", u.span())
                .attr("operator", tokens(&u.op))
                .child("expr", Some(self.expr(&u.expr)))
                .build(),
            Expr::Call(c) => node("ExprCall", c.span())
                .child("function", Some(self.expr(&c.func)))
                .list("arguments", self.exprs(c.args.iter()))
                .build(),
            Expr::MethodCall(m) => node("ExprMethodCall", m.span())
                .child("receiver", Some(self.expr(&m.receiver)))
                .child("name", Some(self.ident(&m.method)))
                .list("arguments", self.exprs(m.args.iter()))
                .build(),
            Expr::Field(f) => node("ExprField", f.span())
                .attr("member", tokens(&f.member))
                .child("base", Some(self.expr(&f.base)))
                .build(),
            Expr::Index(i) => node("ExprIndex", i.span())
                .child("expr", Some(self.expr(&i.expr)))
                .child("index", Some(self.expr(&i.index)))
                .build(),
            Expr::Paren(p) => node("ExprParen", p.span())
                .child("expr", Some(self.expr(&p.expr)))
                .build(),
            Expr::Group(g) => self.expr(&g.expr),
            Expr::Reference(r) => node("ExprReference", r.span())
                .attr("mutable", bool_attr(r.mutability.is_some()))
                .child("expr", Some(self.expr(&r.expr)))
                .build(),
            Expr::Cast(c) => node("ExprCast", c.span())
                .child("expr", Some(self.expr(&c.expr)))
                .child("ty", Some(self.ty(&c.ty)))
                .build(),
            Expr::Tuple(t) => node("ExprTuple", t.span())
                .list("elements", self.exprs(t.elems.iter()))
                .build(),
            Expr::Array(a) => node("ExprArray", a.span())
                .list("elements", self.exprs(a.elems.iter()))
                .build(),
            Expr::Repeat(r) => node("ExprRepeat", r.span())
                .child("expr", Some(self.expr(&r.expr)))
                .child("len", Some(self.expr(&r.len)))
                .build(),
            Expr::Struct(s) => {
                let fields = s
                    .fields
                    .iter()
                    .map(|f| {
                        self.start("FieldValue", f.span())
                            .attr("member", tokens(&f.member))
                            .child("expr", Some(self.expr(&f.expr)))
                            .build()
                    })
                    .collect();
                let mut builder = node("ExprStruct", s.span()).attr("path", tokens(&s.path));
                if let Some(last) = s.path.segments.last() {
                    builder = builder.constructed_type(last.ident.to_string());
                }
                builder
                    .child("rest", s.rest.as_ref().map(|r| self.expr(r)))
                    .list("fields", fields)
                    .build()
            }
            Expr::If(i) => node("ExprIf", i.span())
                .child("condition", Some(self.expr(&i.cond)))
                .child("then_branch", Some(self.block(&i.then_branch)))
                .child(
                    "else_branch",
                    i.else_branch.as_ref().map(|(_, e)| self.expr(e)),
                )
                .build(),
            Expr::While(w) => node("ExprWhile", w.span())
                .attr_opt("label", Self::label(w.label.as_ref()))
                .child("condition", Some(self.expr(&w.cond)))
                .child("body", Some(self.block(&w.body)))
                .build(),
            Expr::ForLoop(f) => node("ExprForLoop", f.span())
                .attr_opt("label", Self::label(f.label.as_ref()))
                .child("pat", Some(self.pat(&f.pat)))
                .child("expr", Some(self.expr(&f.expr)))
                .child("body", Some(self.block(&f.body)))
                .build(),
            Expr::Loop(l) => node("ExprLoop", l.span())
                .attr_opt("label", Self::label(l.label.as_ref()))
                .child("body", Some(self.block(&l.body)))
                .build(),
            Expr::Block(b) => node("ExprBlock", b.span())
                .attr_opt("label", Self::label(b.label.as_ref()))
                .child("block", Some(self.block(&b.block)))
                .build(),
            Expr::Unsafe(u) => node("ExprUnsafe", u.span())
                .child("block", Some(self.block(&u.block)))
                .build(),
            Expr::Async(a) => node("ExprAsync", a.span())
                .attr("move", bool_attr(a.capture.is_some()))
                .child("block", Some(self.block(&a.block)))
                .build(),
            Expr::Await(a) => node("ExprAwait", a.span())
                .child("base", Some(self.expr(&a.base)))
                .build(),
            Expr::Try(t) => node("ExprTry", t.span())
                .child("expr", Some(self.expr(&t.expr)))
                .build(),
            Expr::Return(r) => node("ExprReturn", r.span())
                .child("expr", r.expr.as_ref().map(|e| self.expr(e)))
                .build(),
            Expr::Break(b) => node("ExprBreak", b.span())
                .attr_opt("label", b.label.as_ref().map(tokens))
                .child("expr", b.expr.as_ref().map(|e| self.expr(e)))
                .build(),
            Expr::Continue(c) => node("ExprContinue", c.span())
                .attr_opt("label", c.label.as_ref().map(tokens))
                .build(),
            Expr::Assign(a) => node("ExprAssign", a.span())
                .child("left", Some(self.expr(&a.left)))
                .child("right", Some(self.expr(&a.right)))
                .build(),
            Expr::Range(r) => node("ExprRange", r.span())
                .attr("limits", tokens(&r.limits))
                .child("start", r.start.as_ref().map(|e| self.expr(e)))
                .child("end", r.end.as_ref().map(|e| self.expr(e)))
                .build(),
            Expr::Closure(c) => {
                let return_type = match &c.output {
                    ReturnType::Default => None,
                    ReturnType::Type(_, ty) => Some(self.ty(ty)),
                };
                node("ExprClosure", c.span())
                    .attr("move", bool_attr(c.capture.is_some()))
                    .child("return_type", return_type)
                    .child("body", Some(self.expr(&c.body)))
                    .list("inputs", self.pats(c.inputs.iter()))
                    .build()
            }
            Expr::Match(m) => {
                let arms = m
                    .arms
                    .iter()
                    .map(|arm| {
                        self.attrs(self.start("Arm", arm.span()), &arm.attrs)
                            .child("pat", Some(self.pat(&arm.pat)))
                            .child("guard", arm.guard.as_ref().map(|(_, g)| self.expr(g)))
                            .child("body", Some(self.expr(&arm.body)))
                            .build()
                    })
                    .collect();
                node("ExprMatch", m.span())
                    .child("expr", Some(self.expr(&m.expr)))
                    .list("arms", arms)
                    .build()
            }
            Expr::Let(l) => node("ExprLet", l.span())
                .child("pat", Some(self.pat(&l.pat)))
                .child("expr", Some(self.expr(&l.expr)))
                .build(),
            Expr::Macro(m) => node("ExprMacro", m.span())
                .attr("path", tokens(&m.mac.path))
                .attr("tokens", tokens(&m.mac.tokens))
                .build(),
            other => node("Expr", other.span())
                .attr("tokens", tokens(other))
                .build(),
        }
    }
}
