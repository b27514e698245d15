fn main() -> eframe::Result<()> {
    datascope::native::run()
}
