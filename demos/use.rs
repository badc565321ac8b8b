use avl_engine::AvlTree;

fn main() {
    let mut tree = AvlTree::new();
    for value in [5, 3, 8, 1, 4, 7, 9, 2, 6] {
        tree.insert(value);
    }
    assert!(tree.contains(&6));
    assert!(!tree.insert(6));

    tree.remove(&5);
    assert!(!tree.contains(&5));
    tree.insert(5);
    assert!(tree.contains(&5));

    match tree.try_insert(10) {
        Ok(inserted) => println!("inserted 10: {inserted}"),
        Err(err) => eprintln!("{err}"),
    }

    print!("{}", tree.pretty().width(64));
}
