use avl_engine::AvlTree;

fn main() {
    let mut tree = AvlTree::new();
    for value in 1..=6 {
        tree.insert(value);
    }

    println!("Level-order traversal:");
    tree.traverse_level_order(|entry| {
        println!(
            "Value: {}, Depth: {}, Position: {}",
            entry.value, entry.depth, entry.position
        );
    });

    print!("{}", tree.pretty());
}
