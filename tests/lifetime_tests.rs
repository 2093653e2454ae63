use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use dynarray::{dynarray, DynamicArray};

/// Element that records how many instances were dropped.
#[derive(Debug)]
struct Tracked {
    id: usize,
    drops: Rc<Cell<usize>>,
}

impl Tracked {
    fn new(id: usize, drops: &Rc<Cell<usize>>) -> Self {
        Self {
            id,
            drops: Rc::clone(drops),
        }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Self::new(self.id, &self.drops)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// Clone that panics once the shared budget runs out.
struct FragileClone {
    budget: Rc<Cell<usize>>,
    value: u32,
}

impl Clone for FragileClone {
    fn clone(&self) -> Self {
        let left = self.budget.get();
        if left == 0 {
            panic!("clone budget exhausted");
        }
        self.budget.set(left - 1);
        Self {
            budget: Rc::clone(&self.budget),
            value: self.value,
        }
    }
}

fn ids(array: &DynamicArray<Tracked>) -> Vec<usize> {
    array.iter().map(|item| item.id).collect()
}

#[test]
fn test_drop_runs_for_every_live_element() {
    let drops = Rc::new(Cell::new(0));
    {
        let mut array = DynamicArray::with_capacity(16);
        for id in 0..5 {
            array.push_back(Tracked::new(id, &drops));
        }
        assert_eq!(drops.get(), 0);
    }
    assert_eq!(drops.get(), 5);
}

#[test]
fn test_reallocation_does_not_drop_elements() {
    let drops = Rc::new(Cell::new(0));
    let mut array = DynamicArray::new();

    for id in 0..33 {
        array.push_back(Tracked::new(id, &drops));
    }
    array.reserve(100);
    array.shrink_to_fit();

    assert_eq!(drops.get(), 0);
    assert_eq!(ids(&array), (0..33).collect::<Vec<_>>());
}

#[test]
fn test_pop_back_hands_element_to_caller() {
    let drops = Rc::new(Cell::new(0));
    let mut array = dynarray![Tracked::new(0, &drops), Tracked::new(1, &drops)];

    let popped = array.pop_back();
    assert_eq!(drops.get(), 0);
    drop(popped);
    assert_eq!(drops.get(), 1);
    assert_eq!(array.len(), 1);
}

#[test]
fn test_clear_truncate_and_resize_drop_removed_elements() {
    let drops = Rc::new(Cell::new(0));
    let mut array: DynamicArray<Tracked> = (0..10).map(|id| Tracked::new(id, &drops)).collect();

    array.truncate(8);
    assert_eq!(drops.get(), 2);

    array.resize_with(5, || unreachable!());
    assert_eq!(drops.get(), 5);

    array.clear();
    assert_eq!(drops.get(), 10);
    assert!(array.capacity() >= 10);
}

#[test]
fn test_erase_drops_only_erased_elements() {
    let drops = Rc::new(Cell::new(0));
    let mut array: DynamicArray<Tracked> = (0..6).map(|id| Tracked::new(id, &drops)).collect();

    array.erase(array.begin() + 1);
    assert_eq!(drops.get(), 1);

    array.erase_range(array.begin() + 1, array.begin() + 3);
    assert_eq!(drops.get(), 3);
    assert_eq!(ids(&array), vec![0, 4, 5]);

    drop(array);
    assert_eq!(drops.get(), 6);
}

#[test]
fn test_insert_keeps_every_element_alive() {
    let drops = Rc::new(Cell::new(0));
    let mut array: DynamicArray<Tracked> = (0..3).map(|id| Tracked::new(id, &drops)).collect();

    array.insert(array.begin() + 1, Tracked::new(10, &drops));
    array.insert_n(array.end(), 2, Tracked::new(20, &drops));
    array.insert_iter(array.begin(), (30..32).map(|id| Tracked::new(id, &drops)));

    assert_eq!(ids(&array), vec![30, 31, 0, 10, 1, 2, 20, 20]);
    assert_eq!(drops.get(), 0);

    drop(array);
    assert_eq!(drops.get(), 8);
}

#[test]
fn test_assign_drops_previous_contents() {
    let drops = Rc::new(Cell::new(0));
    let mut array: DynamicArray<Tracked> = (0..4).map(|id| Tracked::new(id, &drops)).collect();

    // The four old elements go, and so does the template once it has been cloned.
    array.assign(2, Tracked::new(9, &drops));
    assert_eq!(drops.get(), 5);
    assert_eq!(ids(&array), vec![9, 9]);

    let replacement = [Tracked::new(1, &drops)];
    array.assign_from_slice(&replacement);
    assert_eq!(drops.get(), 7);
    drop(replacement);
    drop(array);
    assert_eq!(drops.get(), 9);
}

#[test]
fn test_partially_consumed_into_iter_drops_rest() {
    let drops = Rc::new(Cell::new(0));
    let array: DynamicArray<Tracked> = (0..5).map(|id| Tracked::new(id, &drops)).collect();

    let mut iter = array.into_iter();
    let first = iter.next();
    drop(iter);

    assert_eq!(drops.get(), 4);
    drop(first);
    assert_eq!(drops.get(), 5);
}

#[test]
fn test_swap_and_take_transfer_ownership() {
    let drops = Rc::new(Cell::new(0));
    let mut a = dynarray![Tracked::new(1, &drops)];
    let mut b = dynarray![Tracked::new(2, &drops), Tracked::new(3, &drops)];

    a.swap(&mut b);
    let taken = a.take();
    assert_eq!(drops.get(), 0);

    drop(a);
    assert_eq!(drops.get(), 0);
    drop(taken);
    assert_eq!(drops.get(), 2);
    drop(b);
    assert_eq!(drops.get(), 3);
}

#[test]
fn test_panicking_clone_in_insert_n_restores_array() {
    let budget = Rc::new(Cell::new(usize::MAX));
    let make = |value| FragileClone {
        budget: Rc::clone(&budget),
        value,
    };
    let mut array = dynarray![make(1), make(2), make(3)];
    budget.set(1);

    let result = catch_unwind(AssertUnwindSafe(|| {
        array.insert_n(array.begin() + 1, 4, make(7));
    }));

    assert!(result.is_err());
    let values: Vec<u32> = array.iter().map(|item| item.value).collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn test_panicking_constructor_in_emplace_restores_array() {
    let drops = Rc::new(Cell::new(0));
    let mut array: DynamicArray<Tracked> = (0..3).map(|id| Tracked::new(id, &drops)).collect();

    let result = catch_unwind(AssertUnwindSafe(|| {
        array.emplace(array.begin(), || panic!("construction failed"));
    }));

    assert!(result.is_err());
    assert_eq!(ids(&array), vec![0, 1, 2]);
    assert_eq!(drops.get(), 0);
}

#[test]
fn test_panicking_constructor_in_emplace_back_adds_nothing() {
    let mut array = dynarray![1, 2];

    let result = catch_unwind(AssertUnwindSafe(|| {
        array.emplace_back(|| panic!("construction failed"));
    }));

    assert!(result.is_err());
    assert_eq!(array, [1, 2]);
}

#[test]
fn test_panicking_fill_in_resize_keeps_written_prefix() {
    let mut array = dynarray![1, 2];
    let mut produced = 0;

    let result = catch_unwind(AssertUnwindSafe(|| {
        array.resize_with(6, || {
            produced += 1;
            if produced == 3 {
                panic!("fill failed");
            }
            produced
        });
    }));

    assert!(result.is_err());
    assert_eq!(array, [1, 2, 1, 2]);
    assert_eq!(array.capacity(), 6);
}

#[test]
fn test_clone_is_deep() {
    let drops = Rc::new(Cell::new(0));
    let original = dynarray![Tracked::new(1, &drops), Tracked::new(2, &drops)];

    let copy = original.clone();
    drop(original);

    assert_eq!(drops.get(), 2);
    assert_eq!(ids(&copy), vec![1, 2]);
}
