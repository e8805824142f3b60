//! rlearn command line interface
//!
//! Train, evaluate and cross-validate the toolkit's classifiers on
//! LibSVM-format data.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use rlearn::core::{Classifier, Dataset, LearningCurve, Result};
use rlearn::models::{
    AdaBoost, DecisionStump, DecisionTree, FisherLda, Impurity, KNearestNeighbours,
    LogisticRegression,
};
use rlearn::persistence::{load_model, save_model};
use rlearn::validation::{cross_validate, SplitMetrics};
use rlearn::vector::EuclideanDistance;
use rlearn::LibSvmDataset;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "rlearn")]
#[command(about = "Classical machine learning on sparse-aware vectors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a logistic regression model and save it
    Train(TrainArgs),
    /// Predict labels for a data file with a saved model
    Predict(PredictArgs),
    /// Evaluate a saved model on labelled data
    Evaluate(EvaluateArgs),
    /// Run k-fold cross-validation for a chosen classifier
    CrossValidate(CrossValidateArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (LibSVM format)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Learning rate for stochastic gradient descent
    #[arg(long, default_value = "0.01")]
    learning_rate: f64,

    /// Minimum passes over the pool before convergence may stop training
    #[arg(long, default_value = "5")]
    min_epochs: usize,

    /// Hard cap on passes over the pool
    #[arg(long, default_value = "200")]
    max_epochs: usize,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file
    #[arg(long)]
    data: PathBuf,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Labelled data file
    #[arg(long)]
    data: PathBuf,
}

#[derive(Args)]
struct CrossValidateArgs {
    /// Labelled data file
    #[arg(long)]
    data: PathBuf,

    /// Number of folds
    #[arg(short, long, default_value = "5")]
    folds: usize,

    /// Classifier to validate
    #[arg(long, default_value = "logistic")]
    model: CliModel,

    /// Impurity criterion for stump-based models
    #[arg(long, default_value = "gini")]
    impurity: CliImpurity,

    /// Estimator cap for the boosted ensemble
    #[arg(long, default_value = "20")]
    max_estimators: usize,

    /// Depth cap for the decision tree
    #[arg(long, default_value = "8")]
    max_depth: usize,
}

#[derive(ValueEnum, Clone, Debug)]
enum CliModel {
    /// Logistic regression (SGD)
    Logistic,
    /// Single decision stump
    Stump,
    /// Decision tree over stump splits
    Tree,
    /// AdaBoost over decision stumps
    Adaboost,
    /// k-nearest neighbours with a VP-tree index
    Knn,
    /// Fisher linear discriminant
    Lda,
}

#[derive(ValueEnum, Clone, Debug)]
enum CliImpurity {
    InfoGain,
    MutualInfo,
    ChiSquare,
    Gini,
}

impl From<CliImpurity> for Impurity {
    fn from(cli: CliImpurity) -> Self {
        match cli {
            CliImpurity::InfoGain => Impurity::InfoGain,
            CliImpurity::MutualInfo => Impurity::MutualInfo,
            CliImpurity::ChiSquare => Impurity::ChiSquare,
            CliImpurity::Gini => Impurity::Gini,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let outcome = match cli.command {
        Commands::Train(args) => run_train(args),
        Commands::Predict(args) => run_predict(args),
        Commands::Evaluate(args) => run_evaluate(args),
        Commands::CrossValidate(args) => run_cross_validate(args),
    };

    if let Err(e) = outcome {
        error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let dataset = LibSvmDataset::from_file(&args.data)?;
    info!(
        "loaded {} instances with {} features",
        dataset.len(),
        dataset.dim()
    );

    let mut model = LogisticRegression::new(dataset.dim(), args.min_epochs, args.max_epochs)
        .with_learning_rate(args.learning_rate);
    let pool = dataset.to_pool();
    let mut curve = LearningCurve::new();
    model.learn(&pool, &[], &mut curve)?;

    save_model(&model, &args.output)?;
    println!(
        "Trained on {} instances; model complexity {}; saved to {}",
        pool.len(),
        model.complexity(),
        args.output.display()
    );
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    let dataset = LibSvmDataset::from_file(&args.data)?;

    for i in 0..dataset.len() {
        let instance = dataset.get_instance(i);
        let label = model.predict(&instance.features);
        println!("{}", if label > 0.0 { "+1" } else { "-1" });
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    let dataset = LibSvmDataset::from_file(&args.data)?;
    let pool = dataset.to_pool();

    let counts = model.evaluate(&pool);
    println!("Instances : {}", pool.len());
    println!("Accuracy  : {:.4}", counts.accuracy());
    println!("Precision : {:.4}", counts.precision());
    println!("Recall    : {:.4}", counts.recall());
    println!("F1 score  : {:.4}", counts.f1_score());
    println!("RMSE      : {:.4}", model.rmse(&pool));
    Ok(())
}

fn print_split(name: &str, metrics: &SplitMetrics) {
    println!(
        "{name}: precision {:.4}, recall {:.4}, f1 {:.4}, accuracy {:.4}, rmse {:.4}",
        metrics.precision, metrics.recall, metrics.f1, metrics.accuracy, metrics.rmse
    );
}

fn run_cross_validate(args: CrossValidateArgs) -> Result<()> {
    let dataset = LibSvmDataset::from_file(&args.data)?;
    let pool = dataset.to_pool();
    let impurity: Impurity = args.impurity.into();

    let report = match args.model {
        CliModel::Logistic => {
            let mut model = LogisticRegression::new(dataset.dim(), 5, 200);
            cross_validate(&mut model, &pool, args.folds)?
        }
        CliModel::Stump => {
            let mut model = DecisionStump::new(impurity);
            cross_validate(&mut model, &pool, args.folds)?
        }
        CliModel::Tree => {
            let mut model = DecisionTree::new(DecisionStump::new(impurity), 0.98, args.max_depth);
            cross_validate(&mut model, &pool, args.folds)?
        }
        CliModel::Adaboost => {
            let mut model = AdaBoost::new(DecisionStump::new(impurity), args.max_estimators);
            cross_validate(&mut model, &pool, args.folds)?
        }
        CliModel::Knn => {
            let mut model = KNearestNeighbours::new(EuclideanDistance);
            cross_validate(&mut model, &pool, args.folds)?
        }
        CliModel::Lda => {
            let mut model = FisherLda::new(dataset.dim());
            cross_validate(&mut model, &pool, args.folds)?
        }
    };

    for fold in &report.folds {
        println!(
            "fold {} ({} ms, complexity {}):",
            fold.fold,
            fold.duration.as_millis(),
            fold.complexity
        );
        print_split("  learn", &fold.learn);
        print_split("  eval ", &fold.eval);
    }
    println!("averages over {} folds:", report.folds.len());
    print_split("  learn", &report.average_learn());
    print_split("  eval ", &report.average_eval());
    println!(
        "  duration {} ms, complexity {:.1}",
        report.average_duration().as_millis(),
        report.average_complexity()
    );
    Ok(())
}
