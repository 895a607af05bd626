fn main() {
    venue_office_api::main();
}
