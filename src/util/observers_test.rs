use super::*;

#[test]
fn notify_reaches_every_listener_in_order() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let observers = Observers::<u32>::new();
    let a = Rc::clone(&seen);
    observers.subscribe(move |v| a.borrow_mut().push(("a", *v)));
    let b = Rc::clone(&seen);
    observers.subscribe(move |v| b.borrow_mut().push(("b", *v)));

    observers.notify(&7);

    assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
}

#[test]
fn unsubscribe_detaches_only_that_listener() {
    let count = Rc::new(Cell::new(0));
    let observers = Observers::<()>::new();
    let c1 = Rc::clone(&count);
    let first = observers.subscribe(move |()| c1.set(c1.get() + 1));
    let c2 = Rc::clone(&count);
    observers.subscribe(move |()| c2.set(c2.get() + 10));

    assert!(observers.unsubscribe(first));
    assert!(!observers.unsubscribe(first));
    observers.notify(&());

    assert_eq!(count.get(), 10);
    assert_eq!(observers.len(), 1);
}

#[test]
fn listener_may_unsubscribe_itself_during_dispatch() {
    let observers = Rc::new(Observers::<()>::new());
    let slot = Rc::new(Cell::new(None));
    let inner = Rc::clone(&observers);
    let inner_slot = Rc::clone(&slot);
    let id = observers.subscribe(move |()| {
        if let Some(id) = inner_slot.get() {
            inner.unsubscribe(id);
        }
    });
    slot.set(Some(id));

    observers.notify(&());

    assert!(observers.is_empty());
}
