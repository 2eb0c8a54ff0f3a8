//! Shared and cyclic structs behind Rc<RefCell<_>>

use fromenv::{FromEnv, Options};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default, FromEnv)]
struct Node {
    #[env("NODE_WEIGHT=1")]
    pub weight: u32,

    pub peer: Option<Rc<RefCell<Node>>>,
}

fn main() -> anyhow::Result<()> {
    let a = Rc::new(RefCell::new(Node::default()));
    let b = Rc::new(RefCell::new(Node::default()));
    a.borrow_mut().peer = Some(Rc::clone(&b));
    b.borrow_mut().peer = Some(Rc::clone(&a));

    // Each node is visited once, so the walk terminates
    Options::new()
        .map([("NODE_WEIGHT", "7")])
        .unmarshal(&mut Rc::clone(&a))?;

    println!("a.weight = {}", a.borrow().weight);
    println!("b.weight = {}", b.borrow().weight);

    // Break the cycle so both nodes are dropped
    a.borrow_mut().peer = None;

    Ok(())
}
