//! Headless walk through a small app: a base layout, three pages, the error
//! page and a persistent todo list.
//!
//! Run with `RUST_LOG=sahara_spa=debug cargo run --example todos` to see the
//! navigation log.

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use futures::executor::LocalPool;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use sahara_spa::{
    error_page_class, field, observe_persistent, ClickEvent, Component, ComponentClass,
    ElementContext, Field, FileStorage, HostEvent, MountError, NavigationEngine, ObservableState,
    StaticModuleLoader,
};
use sahara_spa::engine::{Dom, NodeId};
use sahara_spa::error::DomError;

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Todo {
    id: u64,
    text: String,
    done: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TodoState {
    todos: Vec<Todo>,
}

const TODOS: Field<TodoState, Vec<Todo>> = field!(TodoState, todos: Vec<Todo>);

// =============================================================================
// Components
// =============================================================================

struct BaseLayout;

impl Component for BaseLayout {
    fn connected(&self, ctx: &ElementContext) -> Result<(), MountError> {
        ctx.with_dom(|dom, host| {
            let nav = dom.append_element(host, "nav", &[], None)?;
            for (href, label) in [("/", "Home"), ("/about/", "About"), ("/demos/todos", "Todos")] {
                dom.append_element(nav, "a", &[("href", href)], Some(label))?;
            }
            dom.append_element(host, "div", &[("id", "slot")], None)?;
            Ok::<_, MountError>(())
        })?
    }
}

/// Page that renders a heading and a paragraph.
struct TextPage {
    title: &'static str,
    body: &'static str,
}

impl Component for TextPage {
    fn connected(&self, ctx: &ElementContext) -> Result<(), MountError> {
        let (title, body) = (self.title, self.body);
        ctx.with_dom(|dom, host| {
            dom.append_element(host, "h1", &[], Some(title))?;
            dom.append_element(host, "p", &[], Some(body))?;
            Ok::<_, MountError>(())
        })?
    }
}

struct TodosPage {
    state: ObservableState<TodoState>,
    /// Unsubscribes the list renderer when the element is released.
    cleanup: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl TodosPage {
    fn new(state: ObservableState<TodoState>) -> Self {
        Self {
            state,
            cleanup: RefCell::new(None),
        }
    }
}

impl Drop for TodosPage {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.get_mut().take() {
            cleanup();
        }
    }
}

impl Component for TodosPage {
    fn connected(&self, ctx: &ElementContext) -> Result<(), MountError> {
        let list = ctx.with_dom(|dom, host| {
            let container = dom.append_element(host, "div", &[("class", "container")], None)?;
            dom.append_element(container, "h1", &[], Some("Todo List Demo"))?;
            dom.append_element(container, "ul", &[("id", "todo-list")], None)
        })??;

        let todos = self.state.get(&TODOS);
        ctx.with_dom(|dom, _| render_list(dom, list, &todos))??;

        let ctx = ctx.clone();
        let unsubscribe = self.state.on_change(&TODOS, move |todos| {
            let rendered = ctx.with_dom(|dom, _| render_list(dom, list, todos));
            if let Ok(Err(err)) | Err(err) = rendered {
                tracing::debug!(error = %err, "todo list not rendered");
            }
        });
        if let Some(previous) = self.cleanup.replace(Some(Box::new(unsubscribe))) {
            previous();
        }
        Ok(())
    }
}

fn render_list(dom: &mut Dom, list: NodeId, todos: &[Todo]) -> Result<(), DomError> {
    dom.clear_children(list)?;
    if todos.is_empty() {
        dom.append_element(list, "li", &[], Some("No todos yet. Add one above!"))?;
        return Ok(());
    }

    for todo in todos {
        let id = todo.id.to_string();
        let item = dom.append_element(list, "li", &[("data-id", id.as_str())], None)?;
        let checkbox = dom.append_element(item, "input", &[("type", "checkbox")], None)?;
        if todo.done {
            dom.set_attribute(checkbox, "checked", "")?;
        }
        dom.append_element(item, "span", &[], Some(todo.text.as_str()))?;
        dom.append_element(item, "button", &[("class", "btn-delete")], Some("Delete"))?;
    }
    Ok(())
}

// =============================================================================
// Todo operations
// =============================================================================

fn add_todo(state: &ObservableState<TodoState>, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    state.update(&TODOS, |todos| {
        let id = todos.iter().map(|todo| todo.id).max().unwrap_or(0) + 1;
        let mut next = todos.clone();
        next.push(Todo {
            id,
            text: text.to_string(),
            done: false,
        });
        next
    });
}

fn toggle_todo(state: &ObservableState<TodoState>, id: u64) {
    state.update(&TODOS, |todos| {
        todos
            .iter()
            .map(|todo| {
                let mut todo = todo.clone();
                if todo.id == id {
                    todo.done = !todo.done;
                }
                todo
            })
            .collect()
    });
}

fn remove_todo(state: &ObservableState<TodoState>, id: u64) {
    state.update(&TODOS, |todos| {
        todos.iter().filter(|todo| todo.id != id).cloned().collect()
    });
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sahara_spa=info")),
        )
        .init();

    let storage = FileStorage::open(std::env::temp_dir().join("sahara-spa-demo"))?;
    let state = observe_persistent(TodoState::default(), "sahara-spa-todos-demo", Rc::new(storage));
    state.on_storage_error(|err| eprintln!("todos not saved: {err}"));

    let mut dom = Dom::new();
    let body = dom.root();
    let app = dom.append_element(body, "main", &[("id", "app")], None)?;
    let dom = dom.shared();

    let layout = ComponentClass::new("BaseLayout", || BaseLayout);
    let home = ComponentClass::with_layout("HomePage", &layout, || TextPage {
        title: "Home",
        body: "Welcome to the demo.",
    });
    let about = ComponentClass::with_layout("AboutPage", &layout, || TextPage {
        title: "About",
        body: "Pages load on demand and mount inside their layouts.",
    });
    let todos_state = state.clone();
    let todos = ComponentClass::with_layout("TodosPage", &layout, move || {
        TodosPage::new(todos_state.clone())
    });

    let loader = StaticModuleLoader::new()
        .page("/", home)
        .page("/about/", about)
        .page("/demos/todos", todos)
        .page("/errors", error_page_class());

    let mut pool = LocalPool::new();
    let engine = NavigationEngine::builder(dom.clone(), app, loader, pool.spawner()).build();

    engine.start();
    pool.run_until_stalled();
    print_page(&engine);

    // Click the "About" link in the layout's nav
    let about_link = {
        let dom = dom.borrow();
        dom.elements_by_tag(body, "a")
            .into_iter()
            .find(|&anchor| dom.attribute(anchor, "href") == Some("/about/"))
    };
    if let Some(link) = about_link {
        let prevented = engine.dispatch_event(&HostEvent::Click(ClickEvent::new(link)));
        println!("click on About intercepted: {prevented}");
        pool.run_until_stalled();
        print_page(&engine);
    }

    engine.navigate_to("/demos/todos");
    pool.run_until_stalled();
    add_todo(&state, "Write the router");
    add_todo(&state, "  Ship it  ");
    add_todo(&state, "   ");
    if let Some(first) = state.with(|s| s.todos.first().map(|todo| todo.id)) {
        toggle_todo(&state, first);
    }
    print_page(&engine);
    if let Some(last) = state.with(|s| s.todos.last().map(|todo| todo.id)) {
        remove_todo(&state, last);
    }
    print_page(&engine);

    engine.navigate_to("/missing");
    pool.run_until_stalled();
    println!("todo list subscribers after leaving: {}", state.listener_count(&TODOS));
    println!("redirected to {}", engine.history().location().href());
    print_page(&engine);

    Ok(())
}

fn print_page(engine: &NavigationEngine) {
    let html = engine.dom().borrow().to_html(engine.mount_target());
    println!("{html}\n");
}
