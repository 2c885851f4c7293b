fn main() {
    altair_ego::term::main();
}
