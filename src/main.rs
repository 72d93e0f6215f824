fn main() -> std::process::ExitCode {
    audio_scribe_lib::run()
}
