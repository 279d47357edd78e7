use clap::Parser;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about = "falsedb placeholder server")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,
}

impl Args {
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_to_8080() {
        let args = Args::try_parse_from(["falsedb"]).unwrap();
        assert_eq!(args.port, DEFAULT_PORT);
        assert_eq!(args.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn short_and_long_flags() {
        assert_eq!(Args::try_parse_from(["falsedb", "-p", "9000"]).unwrap().port, 9000);
        assert_eq!(
            Args::try_parse_from(["falsedb", "--port", "65535"]).unwrap().port,
            65535
        );
    }

    #[test]
    fn out_of_range_ports_are_rejected() {
        for bad in ["0", "65536", "-1", "http"] {
            assert!(Args::try_parse_from(["falsedb", "-p", bad]).is_err(), "{bad}");
        }
    }
}
