/// Print the crate version and the git state it was built from, as JSON.
pub fn print_report(name: &str) {
    println!("{{");
    println!("  \"name\": \"{}\",", name);
    println!("  \"version\": \"{}\",", env!("CARGO_PKG_VERSION"));
    println!("  \"git_describe\": \"{}\",", env!("GIT_DESCRIBE"));
    println!("  \"git_hash\": \"{}\",", env!("GIT_HASH"));
    println!("  \"profiling\": {}", cfg!(feature = "profile-with-puffin"));
    println!("}}");
}
