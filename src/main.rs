fn main() {
    let command_line_interface = tdl_osi::cli::CommandLineInterface::load();
    command_line_interface.run();
}
