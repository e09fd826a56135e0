use sitestress::error::AppResult;

fn main() -> AppResult<()> {
    sitestress::run()
}
