//! Reactive Store - observable state with per-key subscribers.
//!
//! Wraps a plain state struct. Writes go through typed [`Field`] accessors;
//! every write notifies the callbacks registered for that field, in
//! registration order, right after the assignment.
//!
//! Two variants, chosen explicitly:
//!
//! - [`observe`] - in-memory, lost on reload
//! - [`observe_persistent`] - restored from storage on creation, saved on every write
//!
//! Observation is flat: only whole-value writes through a field notify.
//! Mutating the inside of a value without writing it back does not.
//!
//! # Example
//!
//! ```ignore
//! use sahara_spa::{field, state::{observe, Field}};
//!
//! #[derive(Clone, Default)]
//! struct Counter { count: i32 }
//! const COUNT: Field<Counter, i32> = field!(Counter, count: i32);
//!
//! let state = observe(Counter::default());
//! let _cleanup = state.on_change(&COUNT, |count| println!("count = {count}"));
//! state.set(&COUNT, 1);
//! state.update(&COUNT, |count| count + 1);
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::storage::KeyValueStorage;
use crate::error::StoreError;

// =============================================================================
// Field
// =============================================================================

/// Typed accessor for one property `V` of a state struct `T`.
pub struct Field<T, V> {
    name: &'static str,
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T, V> Field<T, V> {
    pub const fn new(name: &'static str, get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self {
        Self { name, get, get_mut }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T, V> Clone for Field<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Field<T, V> {}

impl<T, V> fmt::Debug for Field<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

/// Declare a [`Field`] for a named struct member.
///
/// ```ignore
/// const TODOS: Field<TodoState, Vec<Todo>> = field!(TodoState, todos: Vec<Todo>);
/// ```
#[macro_export]
macro_rules! field {
    ($state:ty, $name:ident : $value:ty) => {{
        fn get(state: &$state) -> &$value {
            &state.$name
        }
        fn get_mut(state: &mut $state) -> &mut $value {
            &mut state.$name
        }
        $crate::state::Field::<$state, $value>::new(stringify!($name), get, get_mut)
    }};
}

// =============================================================================
// Observable State
// =============================================================================

type Listener = Rc<dyn Fn(&dyn Any)>;
type ErrorHook = Rc<dyn Fn(&StoreError)>;

struct Persistence<T> {
    key: String,
    storage: Rc<dyn KeyValueStorage>,
    serialize: fn(&T) -> Result<String, serde_json::Error>,
    on_error: RefCell<Option<ErrorHook>>,
}

struct StateInner<T> {
    state: RefCell<T>,
    listeners: RefCell<HashMap<&'static str, Vec<(usize, Listener)>>>,
    next_id: Cell<usize>,
    persistence: Option<Persistence<T>>,
}

/// Observable wrapper around a state struct. Cloning shares the state.
pub struct ObservableState<T> {
    inner: Rc<StateInner<T>>,
}

impl<T> Clone for ObservableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> ObservableState<T> {
    /// Storage key of the persistent variant.
    pub fn storage_key(&self) -> Option<&str> {
        self.inner.persistence.as_ref().map(|p| p.key.as_str())
    }
}

impl<T> fmt::Debug for ObservableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableState")
            .field("storage_key", &self.storage_key())
            .field("keys", &self.inner.listeners.borrow().len())
            .finish()
    }
}

/// Create in-memory observable state.
pub fn observe<T: 'static>(initial: T) -> ObservableState<T> {
    ObservableState::from_parts(initial, None)
}

/// Create observable state saved under `storage_key`.
///
/// A snapshot previously saved under the key is shallow-merged over
/// `initial`: top-level keys present in the snapshot win. Absent, malformed
/// or incompatible snapshots are ignored.
pub fn observe_persistent<T>(
    initial: T,
    storage_key: impl Into<String>,
    storage: Rc<dyn KeyValueStorage>,
) -> ObservableState<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    let key = storage_key.into();
    let initial = restore(initial, &key, storage.as_ref());
    ObservableState::from_parts(
        initial,
        Some(Persistence {
            key,
            storage,
            serialize: serialize_state::<T>,
            on_error: RefCell::new(None),
        }),
    )
}

fn serialize_state<T: Serialize>(state: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

fn restore<T>(initial: T, key: &str, storage: &dyn KeyValueStorage) -> T
where
    T: Serialize + DeserializeOwned,
{
    let saved = match storage.get_item(key) {
        Ok(Some(saved)) => saved,
        Ok(None) => return initial,
        Err(err) => {
            debug!(key, error = %err, "cannot read saved state");
            return initial;
        }
    };

    let Ok(Value::Object(saved)) = serde_json::from_str::<Value>(&saved) else {
        debug!(key, "ignoring malformed saved state");
        return initial;
    };
    let Ok(Value::Object(mut merged)) = serde_json::to_value(&initial) else {
        return initial;
    };

    merged.extend(saved);
    match serde_json::from_value(Value::Object(merged)) {
        Ok(state) => state,
        Err(err) => {
            debug!(key, error = %err, "ignoring incompatible saved state");
            initial
        }
    }
}

impl<T: 'static> ObservableState<T> {
    fn from_parts(initial: T, persistence: Option<Persistence<T>>) -> Self {
        Self {
            inner: Rc::new(StateInner {
                state: RefCell::new(initial),
                listeners: RefCell::new(HashMap::new()),
                next_id: Cell::new(0),
                persistence,
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current value of `field`.
    pub fn get<V: Clone>(&self, field: &Field<T, V>) -> V {
        (field.get)(&self.inner.state.borrow()).clone()
    }

    /// Read the whole state.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.inner.state.borrow().clone()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Replace the value of `field` and notify its subscribers.
    pub fn set<V: Clone + 'static>(&self, field: &Field<T, V>, value: V) {
        let notified = value.clone();
        *(field.get_mut)(&mut self.inner.state.borrow_mut()) = value;
        self.notify(field.name, &notified);
    }

    /// Replace the value of `field` with one computed from the current value.
    pub fn update<V: Clone + 'static>(&self, field: &Field<T, V>, f: impl FnOnce(&V) -> V) {
        let next = f((field.get)(&self.inner.state.borrow()));
        self.set(field, next);
    }

    fn notify(&self, key: &'static str, value: &dyn Any) {
        // Snapshot so callbacks may subscribe or write without a borrow conflict
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .get(key)
            .map(|list| list.iter().map(|(_, listener)| listener.clone()).collect())
            .unwrap_or_default();

        for listener in listeners {
            listener(value);
        }

        self.persist();
    }

    fn persist(&self) {
        let Some(persistence) = &self.inner.persistence else {
            return;
        };

        let result = (persistence.serialize)(&self.inner.state.borrow())
            .map_err(StoreError::from)
            .and_then(|json| {
                persistence
                    .storage
                    .set_item(&persistence.key, &json)
                    .map_err(StoreError::from)
            });

        if let Err(err) = result {
            debug!(key = %persistence.key, error = %err, "cannot save state");
            let hook = persistence.on_error.borrow().clone();
            if let Some(hook) = hook {
                hook(&err);
            }
        }
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Run `callback` with the new value after every write to `field`.
    ///
    /// Returns a cleanup function. Dropping it without calling it keeps the
    /// subscription for the lifetime of the state.
    pub fn on_change<V, F>(&self, field: &Field<T, V>, callback: F) -> impl FnOnce() + use<T, V, F>
    where
        V: 'static,
        F: Fn(&V) + 'static,
    {
        let key = field.name;
        let listener: Listener = Rc::new(move |value: &dyn Any| {
            if let Some(value) = value.downcast_ref::<V>() {
                callback(value);
            }
        });

        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .entry(key)
            .or_default()
            .push((id, listener));

        let inner = Rc::downgrade(&self.inner);
        move || {
            let Some(inner) = inner.upgrade() else { return };
            let mut listeners = inner.listeners.borrow_mut();
            if let Some(list) = listeners.get_mut(key) {
                list.retain(|(listener_id, _)| *listener_id != id);
                if list.is_empty() {
                    listeners.remove(key);
                }
            }
        }
    }

    /// Number of callbacks registered for `field`.
    pub fn listener_count<V>(&self, field: &Field<T, V>) -> usize {
        self.inner
            .listeners
            .borrow()
            .get(field.name)
            .map_or(0, Vec::len)
    }

    /// Observe failed saves of the persistent variant (replaces any previous hook).
    pub fn on_storage_error(&self, hook: impl Fn(&StoreError) + 'static) {
        if let Some(persistence) = &self.inner.persistence {
            *persistence.on_error.borrow_mut() = Some(Rc::new(hook));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStorage;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Settings {
        theme: String,
        volume: u8,
        tags: Vec<String>,
    }

    const THEME: Field<Settings, String> = field!(Settings, theme: String);
    const VOLUME: Field<Settings, u8> = field!(Settings, volume: u8);
    const TAGS: Field<Settings, Vec<String>> = field!(Settings, tags: Vec<String>);

    #[test]
    fn test_reads_pass_through() {
        let state = observe(Settings {
            theme: "dark".into(),
            ..Settings::default()
        });
        assert_eq!(state.get(&THEME), "dark");
        assert_eq!(state.with(|s| s.volume), 0);
        assert_eq!(THEME.name(), "theme");
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let state = observe(Settings::default());
        let calls = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let calls = calls.clone();
            let _ = state.on_change(&VOLUME, move |v| calls.borrow_mut().push((label, *v)));
        }

        state.set(&VOLUME, 7);
        assert_eq!(
            *calls.borrow(),
            vec![("first", 7), ("second", 7), ("third", 7)]
        );
    }

    #[test]
    fn test_other_keys_do_not_fire() {
        let state = observe(Settings::default());
        let theme_calls = Rc::new(Cell::new(0));
        let count = theme_calls.clone();
        let _ = state.on_change(&THEME, move |_| count.set(count.get() + 1));

        state.set(&VOLUME, 3);
        assert_eq!(theme_calls.get(), 0);

        state.set(&THEME, "light".to_string());
        assert_eq!(theme_calls.get(), 1);
    }

    #[test]
    fn test_write_without_listeners() {
        let state = observe(Settings::default());
        state.set(&VOLUME, 9);
        assert_eq!(state.get(&VOLUME), 9);
        assert_eq!(state.listener_count(&VOLUME), 0);
    }

    #[test]
    fn test_in_place_mutation_is_not_observed() {
        let state = observe(Settings::default());
        let calls = Rc::new(Cell::new(0));
        let count = calls.clone();
        let _ = state.on_change(&TAGS, move |_| count.set(count.get() + 1));

        let mut tags = state.get(&TAGS);
        tags.push("a".into());
        assert_eq!(calls.get(), 0);
        assert!(state.get(&TAGS).is_empty());

        state.update(&TAGS, |tags| {
            let mut next = tags.clone();
            next.push("a".into());
            next
        });
        assert_eq!(calls.get(), 1);
        assert_eq!(state.get(&TAGS), vec!["a".to_string()]);
    }

    #[test]
    fn test_cleanup_removes_only_that_callback() {
        let state = observe(Settings::default());
        let calls = Rc::new(Cell::new(0));

        let a = calls.clone();
        let cleanup = state.on_change(&VOLUME, move |_| a.set(a.get() + 1));
        let b = calls.clone();
        let _keep = state.on_change(&VOLUME, move |_| b.set(b.get() + 10));

        cleanup();
        state.set(&VOLUME, 1);
        assert_eq!(calls.get(), 10);
        assert_eq!(state.listener_count(&VOLUME), 1);
    }

    #[test]
    fn test_callback_may_write_back() {
        let state = observe(Settings::default());
        let writer = state.clone();
        let _ = state.on_change(&VOLUME, move |v| {
            if *v > 10 {
                writer.set(&VOLUME, 10);
            }
        });

        state.set(&VOLUME, 42);
        assert_eq!(state.get(&VOLUME), 10);
    }

    #[test]
    fn test_persistent_restores_and_merges() {
        let storage: Rc<dyn KeyValueStorage> = Rc::new(MemoryStorage::new());

        let first = observe_persistent(Settings::default(), "S", storage.clone());
        first.set(&VOLUME, 1);

        let defaults = Settings {
            theme: "dark".into(),
            ..Settings::default()
        };
        let second = observe_persistent(defaults, "S", storage.clone());
        // Saved keys win over the caller's defaults
        assert_eq!(second.get(&VOLUME), 1);
        assert_eq!(second.get(&THEME), "");
        assert_eq!(second.storage_key(), Some("S"));
    }

    #[test]
    fn test_partial_snapshot_keeps_defaults() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item("S", r#"{"volume":5}"#).unwrap();

        let state = observe_persistent(
            Settings {
                theme: "dark".into(),
                ..Settings::default()
            },
            "S",
            storage,
        );
        assert_eq!(state.get(&VOLUME), 5);
        assert_eq!(state.get(&THEME), "dark");
    }

    #[test]
    fn test_malformed_snapshots_are_ignored() {
        for saved in ["not json", "[1,2,3]", r#"{"volume":"loud"}"#] {
            let storage = Rc::new(MemoryStorage::new());
            storage.set_item("S", saved).unwrap();

            let state = observe_persistent(Settings::default(), "S", storage);
            assert_eq!(state.snapshot(), Settings::default());
        }
    }

    #[test]
    fn test_every_write_saves_full_state() {
        let storage = Rc::new(MemoryStorage::new());
        let state = observe_persistent(Settings::default(), "S", storage.clone());

        state.set(&THEME, "dark".to_string());
        let saved: Settings =
            serde_json::from_str(&storage.get_item("S").unwrap().unwrap()).unwrap();
        assert_eq!(saved.theme, "dark");
        assert_eq!(saved.volume, 0);
    }

    #[test]
    fn test_save_failures_reach_hook() {
        let storage = Rc::new(MemoryStorage::with_quota(8));
        let state = observe_persistent(Settings::default(), "S", storage.clone());

        let failures = Rc::new(Cell::new(0));
        let count = failures.clone();
        state.on_storage_error(move |err| {
            assert!(matches!(err, StoreError::Storage(_)));
            count.set(count.get() + 1);
        });

        // Write still applies and notifies
        let notified = Rc::new(Cell::new(false));
        let flag = notified.clone();
        let _ = state.on_change(&VOLUME, move |_| flag.set(true));

        state.set(&VOLUME, 2);
        assert_eq!(state.get(&VOLUME), 2);
        assert!(notified.get());
        assert_eq!(failures.get(), 1);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_debug_shows_storage_key() {
        let storage: Rc<dyn KeyValueStorage> = Rc::new(MemoryStorage::new());
        let state = observe_persistent(Settings::default(), "settings", storage);
        let _ = state.on_change(&VOLUME, |_| {});
        let debug = format!("{state:?}");
        assert!(debug.contains("\"settings\""));
        assert!(debug.contains("keys: 1"));
    }

    #[test]
    fn test_transient_has_no_storage_key() {
        let state = observe(Settings::default());
        assert_eq!(state.storage_key(), None);
        // Hook is a no-op without persistence
        state.on_storage_error(|_| {});
    }
}
