fn main() {
    bhasha_assist_lib::run()
}
