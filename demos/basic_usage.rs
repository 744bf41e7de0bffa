//! Basic usage tour for radix-rs.

use radix_rs::RadixTree;

fn main() {
    let mut tree: RadixTree<u64> = RadixTree::new();

    // Insert data
    tree.insert("apple", 10);
    tree.insert("app", 70);
    tree.insert("amsterdam", 80);
    tree.insert("mango", 20);
    tree.insert("manchester", 30);
    tree.insert("main", 40);

    // Lookups
    println!("app = {:?}", tree.get("app"));
    println!("appl = {:?}", tree.get("appl"));
    println!("Contains mango: {}", tree.contains_key("mango"));
    println!("Count: {}\n", tree.len());

    // Prefix scan, in lexicographic order
    println!("Prefix scan for 'app':");
    for (key, value) in tree.scan_prefix("app") {
        println!("  {} = {}", String::from_utf8_lossy(&key), value);
    }

    // Bulk prefix deletion
    let removed = tree.remove_prefix("man");
    println!("\nRemoved 'man*': {} (count now {})", removed, tree.len());
    println!("main survives: {:?}", tree.get("main"));

    // Walks
    println!("\nDepth-first:");
    tree.walk_dfs(|key, value| {
        println!("  {} = {}", String::from_utf8_lossy(key), value);
    });

    println!("\nBreadth-first:");
    tree.walk_bfs(|key, value| {
        println!("  {} = {}", String::from_utf8_lossy(key), value);
    });
}
