//! A selectable item with select/deselect commands.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::command::RelayCommand;
use crate::dependency::Declarations;
use crate::observable::{Observable, ObservableObject, ReactOnDependencyChanged};
use crate::property::PropertyCell;

/// Wraps an item with an `IsSelected` flag.
///
/// `SelectCommand` and `DeselectCommand` depend on `IsSelected`: toggling the
/// flag raises both command names and each command's can-execute-changed
/// event.
pub struct SelectionViewModel<T> {
    core: ObservableObject<Self>,
    is_selected: PropertyCell<bool>,
    item: PropertyCell<T>,
    select: RelayCommand,
    deselect: RelayCommand,
}

fn probe_select<T: Item>(vm: &SelectionViewModel<T>) -> Option<&dyn ReactOnDependencyChanged> {
    Some(&vm.select)
}

fn probe_deselect<T: Item>(vm: &SelectionViewModel<T>) -> Option<&dyn ReactOnDependencyChanged> {
    Some(&vm.deselect)
}

/// Bounds on a selectable item.
pub trait Item: PartialEq + Clone + Send + Sync + 'static {}

impl<T: PartialEq + Clone + Send + Sync + 'static> Item for T {}

impl<T: Item> SelectionViewModel<T> {
    pub fn new(item: T) -> Arc<Self> {
        Self::with_selection(item, false)
    }

    pub fn with_selection(item: T, is_selected: bool) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Self>| {
            let (on_select, can_select) = (me.clone(), me.clone());
            let (on_deselect, can_deselect) = (me.clone(), me.clone());
            Self {
                core: ObservableObject::new(),
                is_selected: PropertyCell::new(is_selected),
                item: PropertyCell::new(item),
                select: RelayCommand::with_predicate(
                    move |_: &()| {
                        if let Some(vm) = on_select.upgrade() {
                            vm.set_is_selected(true);
                        }
                    },
                    move |_: &()| can_select.upgrade().is_some_and(|vm| !vm.is_selected()),
                ),
                deselect: RelayCommand::with_predicate(
                    move |_: &()| {
                        if let Some(vm) = on_deselect.upgrade() {
                            vm.set_is_selected(false);
                        }
                    },
                    move |_: &()| can_deselect.upgrade().is_some_and(|vm| vm.is_selected()),
                ),
            }
        })
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected.get()
    }

    pub fn set_is_selected(&self, value: bool) -> bool {
        self.set_slot(&self.is_selected, value, "IsSelected")
    }

    pub fn item(&self) -> T {
        self.item.get()
    }

    pub fn set_item(&self, item: T) -> bool {
        self.set_slot(&self.item, item, "Item")
    }

    pub fn select_command(&self) -> &RelayCommand {
        &self.select
    }

    pub fn deselect_command(&self) -> &RelayCommand {
        &self.deselect
    }
}

impl<T: Item + Default> SelectionViewModel<T> {
    pub fn empty() -> Arc<Self> {
        Self::new(T::default())
    }
}

impl<T: Item> Observable for SelectionViewModel<T> {
    fn core(&self) -> &ObservableObject<Self> {
        &self.core
    }

    fn declare(d: &mut Declarations<Self>) {
        d.property("SelectCommand")
            .depends_on("IsSelected")
            .reacts_with(probe_select::<T>);
        d.property("DeselectCommand")
            .depends_on("IsSelected")
            .reacts_with(probe_deselect::<T>);
    }
}

impl<T: fmt::Debug> fmt::Debug for SelectionViewModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionViewModel")
            .field("is_selected", &self.is_selected)
            .field("item", &self.item)
            .finish_non_exhaustive()
    }
}
