use clap::{Arg, Command};

pub fn make_app() -> Command {
    Command::new("utapi")
        .about("Utilization tracking service for object storage")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_name("PATH")
                .help("Path to the config file"),
        )
        .subcommand(
            Command::new("run")
                .about("Run the query service")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("HOST")
                        .help("Address to bind the HTTP server to"),
                )
                .arg(
                    Arg::new("port")
                        .long("port")
                        .short('p')
                        .value_name("PORT")
                        .help("Port to bind the HTTP server to"),
                )
                .arg(
                    Arg::new("redis_host")
                        .long("redis-host")
                        .value_name("HOST")
                        .help("Host of the Redis instance"),
                )
                .arg(
                    Arg::new("redis_port")
                        .long("redis-port")
                        .value_name("PORT")
                        .help("Port of the Redis instance"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a default config file"))
                .subcommand(Command::new("show").about("Print the effective configuration")),
        )
}
