//! Script-facing classes mirroring the host API.
//!
//! Three classes are registered in every script context: `desktop` (a
//! [`DesktopJs`] instance), plus the [`ElementJs`] and [`CollectionJs`]
//! wrappers its methods hand out. Method names are the camelCase rendition
//! of the host API; every chainable host method returns a fresh wrapper so
//! scripts can keep chaining.

use crate::collection::ElementCollection;
use crate::element::UIElement;
use crate::Desktop;
use rquickjs::{class::Trace, function::Opt, Class, Ctx, Function, IntoJs, JsLifetime, Object, Value};

use super::convert::{self, ScriptArg};

/// Console wrappers over the native sink. Loaded after `__console_log`
/// is registered so scripts can log structured values.
const CONSOLE_GLUE: &str = r#"
globalThis.console = {
    log: function (value) {
        __console_log(typeof value === "string" ? value : (JSON.stringify(value) ?? String(value)));
    }
};
"#;

/// Register the scripting surface on a fresh context: console, the three
/// classes, and the `desktop` entry point.
pub(crate) fn install(ctx: &Ctx<'_>, desktop: Desktop) -> rquickjs::Result<()> {
    let globals = ctx.globals();

    let log_fn = Function::new(ctx.clone(), |_ctx: Ctx, message: String| {
        tracing::info!(target: "script", "{message}");
        println!("{message}");
    })?;
    globals.set("__console_log", log_fn)?;
    ctx.eval::<(), _>(CONSOLE_GLUE)?;

    Class::<DesktopJs>::define(&globals)?;
    Class::<CollectionJs>::define(&globals)?;
    Class::<ElementJs>::define(&globals)?;

    let desktop_obj = Class::<DesktopJs>::instance(ctx.clone(), DesktopJs { desktop })?;
    globals.set("desktop", desktop_obj)?;

    Ok(())
}

fn bounds_object<'js>(ctx: &Ctx<'js>, bounds: crate::element::Bounds) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;
    object.set("x", bounds.x)?;
    object.set("y", bounds.y)?;
    object.set("width", bounds.width)?;
    object.set("height", bounds.height)?;
    Ok(object)
}

/// Run a script predicate over a collection, keeping matching members.
fn filter_with<'js>(
    ctx: &Ctx<'js>,
    collection: &ElementCollection,
    predicate: &Function<'js>,
) -> rquickjs::Result<ElementCollection> {
    let mut kept = Vec::new();
    for element in collection.to_vec() {
        if convert::call_predicate(ctx, predicate, &element)? {
            kept.push(element);
        }
    }
    Ok(collection.with_members(kept))
}

/// Apply an optional predicate argument, passing the collection through
/// untouched when the argument is absent.
fn filter_optional<'js>(
    ctx: &Ctx<'js>,
    collection: ElementCollection,
    argument: Option<Value<'js>>,
) -> rquickjs::Result<ElementCollection> {
    match argument {
        None => Ok(collection),
        Some(value) => {
            let predicate = ScriptArg::classify(value).into_callback(ctx)?;
            filter_with(ctx, &collection, &predicate)
        }
    }
}

/// The script's root object, registered as the global `desktop`.
#[rquickjs::class]
#[derive(Clone, Trace, JsLifetime)]
pub(crate) struct DesktopJs {
    #[qjs(skip_trace)]
    desktop: Desktop,
}

#[rquickjs::methods]
impl DesktopJs {
    /// All top-level windows, optionally narrowed by a predicate function
    /// or a name (string or array of strings).
    pub fn windows<'js>(
        &self,
        ctx: Ctx<'js>,
        argument: Opt<Value<'js>>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let windows = self
            .desktop
            .windows()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        let windows = match argument.0 {
            None => windows,
            Some(value) => match ScriptArg::classify(value) {
                ScriptArg::Callback(predicate) => filter_with(&ctx, &windows, &predicate)?,
                other => windows.filter_by_name(&other.into_strings(&ctx)?),
            },
        };
        Class::instance(ctx, CollectionJs { collection: windows })
    }

    #[qjs(rename = "windowsByName")]
    pub fn windows_by_name<'js>(
        &self,
        ctx: Ctx<'js>,
        names: Value<'js>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let names = ScriptArg::classify(names).into_strings(&ctx)?;
        let windows = self
            .desktop
            .windows_by_name(&names)
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        Class::instance(ctx, CollectionJs { collection: windows })
    }

    #[qjs(rename = "showDesktop")]
    pub fn show_desktop<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, DesktopJs>> {
        self.desktop
            .show_desktop()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        Class::instance(ctx, self.clone())
    }

    pub fn wait<'js>(&self, ctx: Ctx<'js>, millis: u64) -> rquickjs::Result<Class<'js, DesktopJs>> {
        self.desktop.wait(millis);
        Class::instance(ctx, self.clone())
    }

    /// Launch an external process and return immediately.
    pub fn run<'js>(&self, ctx: Ctx<'js>, path: String) -> rquickjs::Result<Class<'js, DesktopJs>> {
        self.desktop
            .run(&path)
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        Class::instance(ctx, self.clone())
    }
}

/// Script wrapper over one element.
#[rquickjs::class]
#[derive(Clone, Trace, JsLifetime)]
pub(crate) struct ElementJs {
    #[qjs(skip_trace)]
    element: UIElement,
}

impl ElementJs {
    pub(crate) fn wrap(element: UIElement) -> Self {
        Self { element }
    }
}

#[rquickjs::methods]
impl ElementJs {
    pub fn name(&self) -> String {
        self.element.name()
    }

    #[qjs(rename = "type")]
    pub fn type_name(&self) -> String {
        self.element.role()
    }

    pub fn visible<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<bool> {
        self.element
            .visible()
            .map_err(|e| convert::throw_automation(&ctx, e))
    }

    pub fn bounds<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Object<'js>> {
        let bounds = self
            .element
            .bounds()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        bounds_object(&ctx, bounds)
    }

    /// With no argument, the element's value (its display name). With an
    /// argument, sets the value and returns the element for chaining.
    pub fn value<'js>(
        &self,
        ctx: Ctx<'js>,
        new_value: Opt<Value<'js>>,
    ) -> rquickjs::Result<Value<'js>> {
        match new_value.0 {
            None => self.element.value().into_js(&ctx),
            Some(value) => {
                let text = convert::coerce_string(&ctx, &value)?;
                self.element
                    .set_value(&text)
                    .map_err(|e| convert::throw_automation(&ctx, e))?;
                Class::instance(ctx.clone(), self.clone())?.into_js(&ctx)
            }
        }
    }

    pub fn click<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, ElementJs>> {
        self.element
            .click()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        Class::instance(ctx, self.clone())
    }

    #[qjs(rename = "doubleClick")]
    pub fn double_click<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, ElementJs>> {
        self.element
            .double_click()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        Class::instance(ctx, self.clone())
    }

    #[qjs(rename = "rightClick")]
    pub fn right_click<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, ElementJs>> {
        self.element
            .right_click()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        Class::instance(ctx, self.clone())
    }

    pub fn focus<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, ElementJs>> {
        self.element
            .focus()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        Class::instance(ctx, self.clone())
    }

    // Window-state operations never throw; failures on non-window
    // elements are absorbed host-side.

    pub fn close<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, ElementJs>> {
        self.element.close();
        Class::instance(ctx, self.clone())
    }

    pub fn minimize<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, ElementJs>> {
        self.element.minimize();
        Class::instance(ctx, self.clone())
    }

    pub fn maximize<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, ElementJs>> {
        self.element.maximize();
        Class::instance(ctx, self.clone())
    }

    pub fn restore<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, ElementJs>> {
        self.element.restore();
        Class::instance(ctx, self.clone())
    }

    /// Direct children, optionally narrowed by a predicate function.
    pub fn children<'js>(
        &self,
        ctx: Ctx<'js>,
        predicate: Opt<Value<'js>>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let children = self
            .element
            .children()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        let children = filter_optional(&ctx, children, predicate.0)?;
        Class::instance(ctx, CollectionJs { collection: children })
    }

    pub fn wait<'js>(&self, ctx: Ctx<'js>, millis: u64) -> rquickjs::Result<Class<'js, ElementJs>> {
        self.element.wait(millis);
        Class::instance(ctx, self.clone())
    }

    /// Back to the desktop root this element came from.
    pub fn desktop<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, DesktopJs>> {
        Class::instance(
            ctx,
            DesktopJs {
                desktop: self.element.desktop(),
            },
        )
    }
}

/// Script wrapper over an element collection.
#[rquickjs::class]
#[derive(Clone, Trace, JsLifetime)]
pub(crate) struct CollectionJs {
    #[qjs(skip_trace)]
    collection: ElementCollection,
}

impl CollectionJs {
    fn chain<'js>(
        &self,
        ctx: Ctx<'js>,
        collection: ElementCollection,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        Class::instance(ctx, CollectionJs { collection })
    }
}

#[rquickjs::methods]
impl CollectionJs {
    pub fn name(&self) -> Vec<String> {
        self.collection.names()
    }

    #[qjs(rename = "type")]
    pub fn type_names(&self) -> Vec<String> {
        self.collection.roles()
    }

    pub fn visible<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Vec<bool>> {
        self.collection
            .visible()
            .map_err(|e| convert::throw_automation(&ctx, e))
    }

    pub fn bounds<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Vec<Object<'js>>> {
        let all = self
            .collection
            .bounds()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        all.into_iter().map(|b| bounds_object(&ctx, b)).collect()
    }

    /// With no argument, every member's value in order. With an argument,
    /// sets the value on every member and returns the collection.
    pub fn value<'js>(
        &self,
        ctx: Ctx<'js>,
        new_value: Opt<Value<'js>>,
    ) -> rquickjs::Result<Value<'js>> {
        match new_value.0 {
            None => self.collection.values().into_js(&ctx),
            Some(value) => {
                let text = convert::coerce_string(&ctx, &value)?;
                let updated = self
                    .collection
                    .set_value(&text)
                    .map_err(|e| convert::throw_automation(&ctx, e))?;
                self.chain(ctx.clone(), updated)?.into_js(&ctx)
            }
        }
    }

    #[qjs(rename = "findByName")]
    pub fn find_by_name<'js>(
        &self,
        ctx: Ctx<'js>,
        names: Value<'js>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let names = ScriptArg::classify(names).into_strings(&ctx)?;
        let found = self
            .collection
            .find_by_name(&names)
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, found)
    }

    #[qjs(rename = "findAndClick")]
    pub fn find_and_click<'js>(
        &self,
        ctx: Ctx<'js>,
        names: Value<'js>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let names = ScriptArg::classify(names).into_strings(&ctx)?;
        let unchanged = self
            .collection
            .find_and_click(&names)
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, unchanged)
    }

    #[qjs(rename = "includeChildren")]
    pub fn include_children<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let widened = self
            .collection
            .include_children()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, widened)
    }

    /// Direct children of all members, optionally narrowed by a predicate.
    pub fn children<'js>(
        &self,
        ctx: Ctx<'js>,
        predicate: Opt<Value<'js>>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let children = self
            .collection
            .children()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        let children = filter_optional(&ctx, children, predicate.0)?;
        self.chain(ctx, children)
    }

    #[qjs(rename = "childrenByType")]
    pub fn children_by_type<'js>(
        &self,
        ctx: Ctx<'js>,
        types: Value<'js>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let types = ScriptArg::classify(types).into_strings(&ctx)?;
        let children = self
            .collection
            .children_by_type(&types)
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, children)
    }

    #[qjs(rename = "childrenByName")]
    pub fn children_by_name<'js>(
        &self,
        ctx: Ctx<'js>,
        names: Value<'js>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let names = ScriptArg::classify(names).into_strings(&ctx)?;
        let children = self
            .collection
            .children_by_name(&names)
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, children)
    }

    /// Child labels of all members, optionally narrowed by name.
    pub fn labels<'js>(
        &self,
        ctx: Ctx<'js>,
        names: Opt<Value<'js>>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let labels = match names.0 {
            None => self.collection.labels(),
            Some(value) => {
                let names = ScriptArg::classify(value).into_strings(&ctx)?;
                self.collection.labels_by_name(&names)
            }
        }
        .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, labels)
    }

    #[qjs(rename = "labelsByName")]
    pub fn labels_by_name<'js>(
        &self,
        ctx: Ctx<'js>,
        names: Value<'js>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let names = ScriptArg::classify(names).into_strings(&ctx)?;
        let labels = self
            .collection
            .labels_by_name(&names)
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, labels)
    }

    /// Child buttons of all members, optionally narrowed by name.
    pub fn buttons<'js>(
        &self,
        ctx: Ctx<'js>,
        names: Opt<Value<'js>>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let buttons = match names.0 {
            None => self.collection.buttons(),
            Some(value) => {
                let names = ScriptArg::classify(value).into_strings(&ctx)?;
                self.collection.buttons_by_name(&names)
            }
        }
        .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, buttons)
    }

    #[qjs(rename = "buttonsByName")]
    pub fn buttons_by_name<'js>(
        &self,
        ctx: Ctx<'js>,
        names: Value<'js>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let names = ScriptArg::classify(names).into_strings(&ctx)?;
        let buttons = self
            .collection
            .buttons_by_name(&names)
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, buttons)
    }

    pub fn filter<'js>(
        &self,
        ctx: Ctx<'js>,
        predicate: Value<'js>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let predicate = ScriptArg::classify(predicate).into_callback(&ctx)?;
        let kept = filter_with(&ctx, &self.collection, &predicate)?;
        self.chain(ctx, kept)
    }

    #[qjs(rename = "filterByType")]
    pub fn filter_by_type<'js>(
        &self,
        ctx: Ctx<'js>,
        types: Value<'js>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let types = ScriptArg::classify(types).into_strings(&ctx)?;
        self.chain(ctx, self.collection.filter_by_type(&types))
    }

    #[qjs(rename = "filterByName")]
    pub fn filter_by_name<'js>(
        &self,
        ctx: Ctx<'js>,
        names: Value<'js>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let names = ScriptArg::classify(names).into_strings(&ctx)?;
        self.chain(ctx, self.collection.filter_by_name(&names))
    }

    /// First member (or first matching the predicate). An empty result is
    /// `undefined`, never an error.
    pub fn first<'js>(
        &self,
        ctx: Ctx<'js>,
        predicate: Opt<Value<'js>>,
    ) -> rquickjs::Result<Value<'js>> {
        let element = match predicate.0 {
            None => self.collection.first(),
            Some(value) => {
                let predicate = ScriptArg::classify(value).into_callback(&ctx)?;
                let mut found = None;
                for element in self.collection.to_vec() {
                    if convert::call_predicate(&ctx, &predicate, &element)? {
                        found = Some(element);
                        break;
                    }
                }
                found
            }
        };
        match element {
            Some(element) => Class::instance(ctx.clone(), ElementJs::wrap(element))?.into_js(&ctx),
            None => Ok(Value::new_undefined(ctx)),
        }
    }

    /// Last member (or last matching the predicate), `undefined` when none.
    pub fn last<'js>(
        &self,
        ctx: Ctx<'js>,
        predicate: Opt<Value<'js>>,
    ) -> rquickjs::Result<Value<'js>> {
        let element = match predicate.0 {
            None => self.collection.last(),
            Some(value) => {
                let predicate = ScriptArg::classify(value).into_callback(&ctx)?;
                let mut found = None;
                for element in self.collection.to_vec().into_iter().rev() {
                    if convert::call_predicate(&ctx, &predicate, &element)? {
                        found = Some(element);
                        break;
                    }
                }
                found
            }
        };
        match element {
            Some(element) => Class::instance(ctx.clone(), ElementJs::wrap(element))?.into_js(&ctx),
            None => Ok(Value::new_undefined(ctx)),
        }
    }

    pub fn count<'js>(&self, ctx: Ctx<'js>, predicate: Opt<Value<'js>>) -> rquickjs::Result<usize> {
        match predicate.0 {
            None => Ok(self.collection.count()),
            Some(value) => {
                let predicate = ScriptArg::classify(value).into_callback(&ctx)?;
                let mut matched = 0;
                for element in self.collection.to_vec() {
                    if convert::call_predicate(&ctx, &predicate, &element)? {
                        matched += 1;
                    }
                }
                Ok(matched)
            }
        }
    }

    pub fn get<'js>(&self, ctx: Ctx<'js>, index: i32) -> rquickjs::Result<Class<'js, ElementJs>> {
        if index < 0 {
            return Err(convert::throw_automation(
                &ctx,
                crate::errors::AutomationError::IndexOutOfRange(format!(
                    "index {index} beyond collection of {} elements",
                    self.collection.len()
                )),
            ));
        }
        let element = self
            .collection
            .get(index as usize)
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        Class::instance(ctx, ElementJs::wrap(element))
    }

    /// With a function, run it over every member in order. With a number,
    /// block for that many milliseconds. Returns the collection.
    pub fn each<'js>(
        &self,
        ctx: Ctx<'js>,
        argument: Value<'js>,
    ) -> rquickjs::Result<Class<'js, CollectionJs>> {
        match ScriptArg::classify(argument) {
            ScriptArg::Callback(action) => {
                for element in self.collection.to_vec() {
                    convert::call_action(&ctx, &action, &element)?;
                }
                self.chain(ctx, self.collection.clone())
            }
            ScriptArg::Scalar(value) if value.is_number() => {
                let millis = value.as_number().unwrap_or(0.0).max(0.0) as u64;
                self.chain(ctx, self.collection.wait(millis))
            }
            _ => Err(convert::throw_message(
                &ctx,
                "each() expects a function or a number of milliseconds",
            )),
        }
    }

    pub fn click<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let unchanged = self
            .collection
            .click()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, unchanged)
    }

    #[qjs(rename = "doubleClick")]
    pub fn double_click<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let unchanged = self
            .collection
            .double_click()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, unchanged)
    }

    #[qjs(rename = "rightClick")]
    pub fn right_click<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let unchanged = self
            .collection
            .right_click()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, unchanged)
    }

    pub fn focus<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, CollectionJs>> {
        let unchanged = self
            .collection
            .focus()
            .map_err(|e| convert::throw_automation(&ctx, e))?;
        self.chain(ctx, unchanged)
    }

    // Window-state operations are best-effort over every member.

    pub fn close<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, CollectionJs>> {
        self.chain(ctx, self.collection.close())
    }

    pub fn minimize<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, CollectionJs>> {
        self.chain(ctx, self.collection.minimize())
    }

    pub fn maximize<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, CollectionJs>> {
        self.chain(ctx, self.collection.maximize())
    }

    pub fn restore<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, CollectionJs>> {
        self.chain(ctx, self.collection.restore())
    }

    pub fn wait<'js>(&self, ctx: Ctx<'js>, millis: u64) -> rquickjs::Result<Class<'js, CollectionJs>> {
        self.chain(ctx, self.collection.wait(millis))
    }

    /// Members as a plain script array of element wrappers.
    pub fn array<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Vec<Class<'js, ElementJs>>> {
        self.collection
            .to_vec()
            .into_iter()
            .map(|element| Class::instance(ctx.clone(), ElementJs::wrap(element)))
            .collect()
    }

    /// Back to the desktop root this collection came from.
    pub fn desktop<'js>(&self, ctx: Ctx<'js>) -> rquickjs::Result<Class<'js, DesktopJs>> {
        Class::instance(
            ctx,
            DesktopJs {
                desktop: self.collection.desktop(),
            },
        )
    }
}
