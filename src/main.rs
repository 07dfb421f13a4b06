fn main() {
    link_grammar::cli::run();
}
