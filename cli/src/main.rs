use std::process::exit;

use anyhow::Error;
use env_logger::Env;
use structopt::StructOpt;

use crate::exit_code::FATAL_ERROR;

mod article_stats;
mod cpa;
mod evaluate;
mod exit_code;
mod link_graph;
mod recommend;
mod utils;

/// Co-citation proximity analysis of Wikipedia articles.
#[derive(StructOpt, Debug)]
enum CommandArgs {
    Cpa(cpa::CpaCmd),
    Recommend(recommend::RecommendCmd),
    Evaluate(evaluate::EvaluateCmd),
    ArticleStats(article_stats::ArticleStatsCmd),
    LinkGraph(link_graph::LinkGraphCmd),
}

impl CommandArgs {
    fn run(self) -> Result<i32, Error> {
        use CommandArgs::*;
        match self {
            Cpa(cmd) => cmd.run(),
            Recommend(cmd) => cmd.run(),
            Evaluate(cmd) => cmd.run(),
            ArticleStats(cmd) => cmd.run(),
            LinkGraph(cmd) => cmd.run(),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let exit_code = match CommandArgs::from_args().run() {
        Ok(exit_code) => exit_code,
        Err(error) => {
            eprintln!("{:?}", error);
            FATAL_ERROR
        }
    };

    exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CommandArgs, structopt::clap::Error> {
        CommandArgs::from_iter_safe(std::iter::once("citolytics").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_cpa() {
        let args = parse(&[
            "cpa",
            "--documents",
            "articles.jsonl",
            "-o",
            "pairs.tsv",
            "--alpha",
            "0.5,1.5",
        ])
        .unwrap();
        assert!(matches!(args, CommandArgs::Cpa(_)));
    }

    #[test]
    fn test_parse_evaluate_requires_gold() {
        assert!(parse(&["evaluate", "--pairs", "pairs.tsv", "-o", "results.tsv"]).is_err());
        assert!(parse(&[
            "evaluate",
            "--pairs",
            "pairs.tsv",
            "-o",
            "results.tsv",
            "--see-also",
            "see_also.tsv",
        ])
        .is_ok());
    }

    #[test]
    fn test_parse_cpi_requires_article_stats() {
        assert!(parse(&["recommend", "--pairs", "pairs.tsv", "-o", "out.tsv", "--cpi", "x * y"]).is_err());
    }
}
