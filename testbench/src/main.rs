fn main() {
    let env = env_logger::Env::default()
        .filter_or("RESAMPLER_LOG", "info")
        .write_style_or("RESAMPLER_LOG_STYLE", "auto");

    env_logger::init_from_env(env);

    if let Err(err) = testbench::run() {
        log::error!("resampler error: {err}");
        std::process::exit(1);
    }
}
