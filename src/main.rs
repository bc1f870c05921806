mod app;
mod commands;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = app::run() {
        log::error!("Board failed to start: {err}");
        eprintln!("{}", err.user_message());
        std::process::exit(1);
    }
}
