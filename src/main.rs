fn main() {
    if let Err(err) = supplier_reconcile::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
