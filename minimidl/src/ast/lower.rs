//! Construction of the typed AST from the surface syntax tree.
//!
//! This transform is deterministic and side-effect free: one surface tree
//! always yields one AST shape, which the cache round-trip property relies
//! on. Interface members are split into ordered property and method lists,
//! parenthesized expressions are dropped (grouping is encoded in the tree),
//! and every resolution slot starts out empty.

use crate::ast::{
    Const, Enum, EnumMember, Expr, ForwardDecl, Interface, Item, Method, Module, Namespace, Param,
    Property, Type, Typedef,
};
use crate::surface;

pub fn module(surface: &surface::Module) -> Module {
    Module {
        namespaces: surface.namespaces.iter().map(namespace).collect(),
    }
}

fn namespace(surface: &surface::Namespace) -> Namespace {
    Namespace {
        range: surface.range,
        name: surface.name.1.clone(),
        items: surface.items.iter().map(item).collect(),
    }
}

fn item(surface: &surface::Item) -> Item {
    match surface {
        surface::Item::Forward { range, name } => Item::Forward(ForwardDecl {
            range: *range,
            name: name.1.clone(),
        }),
        surface::Item::Interface {
            range,
            name,
            members,
        } => {
            let mut properties = Vec::new();
            let mut methods = Vec::new();
            for member in members {
                match member {
                    surface::Member::Property {
                        range,
                        name,
                        r#type: property_type,
                        writable,
                    } => properties.push(Property {
                        range: *range,
                        name: name.1.clone(),
                        r#type: r#type(property_type),
                        writable: *writable,
                    }),
                    surface::Member::Method {
                        range,
                        name,
                        return_type,
                        params,
                    } => methods.push(Method {
                        range: *range,
                        name: name.1.clone(),
                        return_type: r#type(return_type),
                        params: params.iter().map(param).collect(),
                    }),
                }
            }
            Item::Interface(Interface {
                range: *range,
                name: name.1.clone(),
                properties,
                methods,
            })
        }
        surface::Item::Enum {
            range,
            name,
            backing,
            members,
        } => Item::Enum(Enum {
            range: *range,
            name: name.1.clone(),
            backing: *backing,
            members: members.iter().map(enum_member).collect(),
        }),
        surface::Item::Typedef {
            range,
            name,
            r#type: aliased,
        } => Item::Typedef(Typedef {
            range: *range,
            name: name.1.clone(),
            r#type: r#type(aliased),
        }),
        surface::Item::Const {
            range,
            name,
            backing,
            expr: init,
        } => Item::Const(Const {
            range: *range,
            name: name.1.clone(),
            backing: *backing,
            expr: expr(init),
            value: None,
        }),
    }
}

fn param(surface: &surface::Param) -> Param {
    Param {
        range: surface.range,
        name: surface.name.1.clone(),
        r#type: r#type(&surface.r#type),
    }
}

fn enum_member(surface: &surface::EnumMember) -> EnumMember {
    EnumMember {
        range: surface.range,
        name: surface.name.1.clone(),
        expr: expr(&surface.expr),
        value: None,
    }
}

fn r#type(surface: &surface::Type) -> Type {
    match surface {
        surface::Type::Prim(range, prim) => Type::Prim {
            range: *range,
            prim: *prim,
        },
        surface::Type::String(range) => Type::String { range: *range },
        surface::Type::Named(range, name) => Type::Named {
            range: *range,
            name: name.clone(),
            target: None,
        },
        surface::Type::Array(range, element) => Type::Array {
            range: *range,
            element: Box::new(r#type(element)),
        },
        surface::Type::Dict(range, key, value) => Type::Dict {
            range: *range,
            key: Box::new(r#type(key)),
            value: Box::new(r#type(value)),
        },
        surface::Type::Set(range, element) => Type::Set {
            range: *range,
            element: Box::new(r#type(element)),
        },
        surface::Type::Nullable(range, inner) => Type::Nullable {
            range: *range,
            inner: Box::new(r#type(inner)),
        },
    }
}

fn expr(surface: &surface::Expr) -> Expr {
    match surface {
        surface::Expr::Number(range, value, style) => Expr::Number {
            range: *range,
            value: *value,
            style: *style,
        },
        surface::Expr::Name(range, name) => Expr::Name {
            range: *range,
            name: name.clone(),
        },
        // Grouping is structural in the AST.
        surface::Expr::Paren(_, inner) => expr(inner),
        surface::Expr::Unary(range, op, operand) => Expr::Unary {
            range: *range,
            op: *op,
            operand: Box::new(expr(operand)),
        },
        surface::Expr::Binary(range, op, lhs, rhs) => Expr::Binary {
            range: *range,
            op: *op,
            lhs: Box::new(expr(lhs)),
            rhs: Box::new(expr(rhs)),
        },
    }
}
