//! Multi-way type switch.
//!
//! Arms are tried in the order they were added and the first match wins,
//! even when a later arm would match more specifically. What an arm's
//! handler receives depends on the arm:
//!
//! | arm                | matches when                           | binds                   |
//! |--------------------|----------------------------------------|-------------------------|
//! | `case(T)`          | dynamic type is `T`                    | `Concrete { T, value }` |
//! | `case(I)`          | dynamic type conforms to interface `I` | original interface      |
//! | `case_any([T, U])` | dynamic type matches one of them       | original interface      |
//! | `case_contract(C)` | dynamic type conforms to `C`           | original interface      |
//! | `nil()`            | the interface is nil                   | original interface      |
//! | `default()`        | no other arm matched                   | original interface      |
//!
//! A switch with no matching arm and no default does nothing.

use ferrule_types::{ContractId, TypeDescriptor, TypeId, TypeKind, TypeRegistry};
use smallvec::SmallVec;
use tracing::trace;

use super::Dispatcher;
use crate::errors::duplicate_default_arm;
use crate::{EvalError, InterfaceValue, Value};

/// Value bound inside a switch arm.
#[derive(Clone, Debug, PartialEq)]
pub enum Narrowed {
    /// The unboxed payload of a single-type arm.
    Concrete { ty: TypeId, value: Value },
    /// The switched-on value, still boxed.
    Interface(InterfaceValue),
}

impl Narrowed {
    /// The bound value as a plain `Value`.
    pub fn into_value(self) -> Value {
        match self {
            Narrowed::Concrete { value, .. } => value,
            Narrowed::Interface(iv) => Value::Interface(iv),
        }
    }
}

/// Which arm ran.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Index of the matching arm, in declaration order (default excluded).
    Matched(usize),
    Default,
    NoMatch,
}

/// Outcome plus the handler's result (`None` on `NoMatch`).
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchResult<R> {
    pub outcome: SwitchOutcome,
    pub value: Option<R>,
}

type Handler<'a, R> = Box<dyn FnOnce(Narrowed) -> Result<R, EvalError> + 'a>;

enum Pattern {
    Types(SmallVec<[TypeId; 2]>),
    Contract(ContractId),
    Nil,
}

struct Arm<'a, R> {
    pattern: Pattern,
    handler: Handler<'a, R>,
}

/// A type switch under construction. Run it with [`TypeSwitch::run`].
pub struct TypeSwitch<'a, R> {
    dispatcher: &'a Dispatcher,
    arms: Vec<Arm<'a, R>>,
    default: Option<Handler<'a, R>>,
    extra_defaults: usize,
}

impl<'a, R> TypeSwitch<'a, R> {
    pub(super) fn new(dispatcher: &'a Dispatcher) -> Self {
        TypeSwitch {
            dispatcher,
            arms: Vec::new(),
            default: None,
            extra_defaults: 0,
        }
    }

    /// `case T:` binds the concrete payload.
    #[must_use]
    pub fn case(
        self,
        ty: TypeId,
        handler: impl FnOnce(Narrowed) -> Result<R, EvalError> + 'a,
    ) -> Self {
        self.arm(Pattern::Types(SmallVec::from_slice(&[ty])), handler)
    }

    /// `case T, U:` binds the original interface value.
    ///
    /// A single-element list behaves like [`case`](Self::case).
    #[must_use]
    pub fn case_any(
        self,
        types: impl IntoIterator<Item = TypeId>,
        handler: impl FnOnce(Narrowed) -> Result<R, EvalError> + 'a,
    ) -> Self {
        self.arm(Pattern::Types(types.into_iter().collect()), handler)
    }

    /// Matches when the dynamic type conforms to `contract`.
    #[must_use]
    pub fn case_contract(
        self,
        contract: ContractId,
        handler: impl FnOnce(Narrowed) -> Result<R, EvalError> + 'a,
    ) -> Self {
        self.arm(Pattern::Contract(contract), handler)
    }

    /// `case nil:`
    #[must_use]
    pub fn nil(self, handler: impl FnOnce(Narrowed) -> Result<R, EvalError> + 'a) -> Self {
        self.arm(Pattern::Nil, handler)
    }

    /// `default:`. At most one is allowed; a second makes `run` fail.
    #[must_use]
    pub fn default(mut self, handler: impl FnOnce(Narrowed) -> Result<R, EvalError> + 'a) -> Self {
        if self.default.is_some() {
            self.extra_defaults += 1;
        } else {
            self.default = Some(Box::new(handler));
        }
        self
    }

    fn arm(
        mut self,
        pattern: Pattern,
        handler: impl FnOnce(Narrowed) -> Result<R, EvalError> + 'a,
    ) -> Self {
        self.arms.push(Arm {
            pattern,
            handler: Box::new(handler),
        });
        self
    }

    /// Evaluate the switch against `iv`.
    ///
    /// Exactly one handler runs, or none. `iv` is not modified. Errors from
    /// the handler, or from resolving a contract arm, propagate unchanged.
    #[tracing::instrument(level = "trace", skip_all, fields(arms = self.arms.len()))]
    pub fn run(self, iv: &InterfaceValue) -> Result<SwitchResult<R>, EvalError> {
        if self.extra_defaults > 0 {
            return Err(duplicate_default_arm());
        }

        let selected = {
            let registry = self.dispatcher.registry().read();
            self.select(&registry, iv)?
        };

        let TypeSwitch { arms, default, .. } = self;
        match selected {
            Some(index) => {
                trace!(index, "arm matched");
                let Some(arm) = arms.into_iter().nth(index) else {
                    return Ok(SwitchResult {
                        outcome: SwitchOutcome::NoMatch,
                        value: None,
                    });
                };
                let bound = bind(&arm.pattern, iv);
                let value = (arm.handler)(bound)?;
                Ok(SwitchResult {
                    outcome: SwitchOutcome::Matched(index),
                    value: Some(value),
                })
            }
            None => match default {
                Some(handler) => {
                    trace!("default arm");
                    let value = handler(Narrowed::Interface(iv.clone()))?;
                    Ok(SwitchResult {
                        outcome: SwitchOutcome::Default,
                        value: Some(value),
                    })
                }
                None => Ok(SwitchResult {
                    outcome: SwitchOutcome::NoMatch,
                    value: None,
                }),
            },
        }
    }

    /// Index of the first matching arm.
    fn select(&self, registry: &TypeRegistry, iv: &InterfaceValue) -> Result<Option<usize>, EvalError> {
        let dynamic = iv.dynamic_type();
        for (index, arm) in self.arms.iter().enumerate() {
            let hit = match (&arm.pattern, dynamic) {
                (Pattern::Nil, None) => true,
                (Pattern::Types(types), Some(ty)) => self.any_type_matches(registry, types, ty)?,
                (Pattern::Contract(contract), Some(ty)) => self
                    .dispatcher
                    .conformance_cache()
                    .conforms(registry, ty, *contract)?,
                _ => false,
            };
            if hit {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// A listed interface type matches by conformance, like `assert_type`.
    fn any_type_matches(
        &self,
        registry: &TypeRegistry,
        types: &[TypeId],
        dynamic: TypeId,
    ) -> Result<bool, EvalError> {
        for &want in types {
            if want == dynamic {
                return Ok(true);
            }
            if let Some(&TypeKind::Interface(contract)) =
                registry.get(want).and_then(TypeDescriptor::kind)
            {
                if self
                    .dispatcher
                    .conformance_cache()
                    .conforms(registry, dynamic, contract)?
                {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

fn bind(pattern: &Pattern, iv: &InterfaceValue) -> Narrowed {
    match (pattern, iv.parts()) {
        (Pattern::Types(types), Some((ty, payload))) if types[..] == [ty] => Narrowed::Concrete {
            ty,
            value: payload.clone(),
        },
        _ => Narrowed::Interface(iv.clone()),
    }
}
