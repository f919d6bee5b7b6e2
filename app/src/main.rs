fn main() -> anyhow::Result<()> {
    router_sim::run()
}
